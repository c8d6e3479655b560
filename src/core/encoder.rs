//! Encoder trait and shared encoder configuration

use super::{error::Result, log_entry::LogEntry, log_level::LogLevel, timestamp::TimestampFormat};
use std::sync::Arc;

/// Turns a merged record into the bytes written to one destination
pub trait Encoder: Send + Sync {
    fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>>;
    fn name(&self) -> &str;
}

/// Builds a fresh encoder for each sub-core
pub type EncoderFactory = Arc<dyn Fn() -> Box<dyn Encoder> + Send + Sync>;

/// How the level is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelEncoding {
    /// `info`
    #[default]
    Lowercase,
    /// `INFO`
    Uppercase,
}

impl LevelEncoding {
    pub fn render(&self, level: LogLevel) -> &'static str {
        match self {
            LevelEncoding::Lowercase => level.to_lowercase_str(),
            LevelEncoding::Uppercase => level.to_str(),
        }
    }
}

/// Key names and rendering options shared by the built-in encoders.
///
/// An empty key omits that element from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub time_key: String,
    pub level_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub message_key: String,
    pub stacktrace_key: String,
    pub level_encoding: LevelEncoding,
    pub timestamp_format: TimestampFormat,
    pub line_ending: String,
    /// Colour the level (console encoder only)
    pub use_colors: bool,
}

impl EncoderConfig {
    /// Preset used by dispatch cores: `ts` in ISO 8601, `stacktrace`
    pub fn dispatch() -> Self {
        Self {
            time_key: "ts".to_string(),
            level_key: "level".to_string(),
            name_key: String::new(),
            caller_key: "caller".to_string(),
            message_key: "msg".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            level_encoding: LevelEncoding::Lowercase,
            timestamp_format: TimestampFormat::Iso8601,
            line_ending: "\n".to_string(),
            use_colors: false,
        }
    }

    /// Preset used by single-file loggers: `time` as `YYYY-MM-DD HH:MM:SS`,
    /// `logger`, `stack`
    pub fn file() -> Self {
        Self {
            time_key: "time".to_string(),
            name_key: "logger".to_string(),
            stacktrace_key: "stack".to_string(),
            timestamp_format: TimestampFormat::DateTime,
            ..Self::dispatch()
        }
    }

    #[must_use]
    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = key.into();
        self
    }

    #[must_use]
    pub fn with_level_encoding(mut self, encoding: LevelEncoding) -> Self {
        self.level_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::dispatch()
    }
}
