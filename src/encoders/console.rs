//! Human-readable console encoder

use crate::core::{Encoder, EncoderConfig, LogEntry, LogLevel, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use serde::ser::{SerializeMap, Serializer};

/// Tab-separated text: `time  LEVEL  logger  caller  message  {"k":"v"}`
///
/// Fields are rendered as a trailing JSON object in merged order; a stack trace
/// goes on the following lines.
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    fn format_level(&self, level: LogLevel) -> String {
        let text = format!("{:5}", self.config.level_encoding.render(level));
        self.paint(level, text)
    }

    #[cfg(feature = "console")]
    fn paint(&self, level: LogLevel, text: String) -> String {
        if self.config.use_colors {
            text.color(level.color_code()).to_string()
        } else {
            text
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, _level: LogLevel, text: String) -> String {
        text
    }

    fn format_fields(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::new(&mut buf);
        let mut map = ser.serialize_map(Some(entry.fields.len()))?;
        for field in &entry.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()?;
        Ok(buf)
    }
}

impl Default for ConsoleEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::dispatch().with_colors(true))
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let mut parts: Vec<String> = Vec::with_capacity(6);

        if !cfg.time_key.is_empty() {
            parts.push(cfg.timestamp_format.format(&entry.timestamp));
        }
        if !cfg.level_key.is_empty() {
            parts.push(self.format_level(entry.level));
        }
        if let (false, Some(name)) = (cfg.name_key.is_empty(), &entry.logger_name) {
            parts.push(name.clone());
        }
        if let (false, Some(caller)) = (cfg.caller_key.is_empty(), &entry.caller) {
            parts.push(caller.short());
        }
        if !cfg.message_key.is_empty() {
            parts.push(entry.message.clone());
        }

        let mut out = parts.join("\t").into_bytes();
        if !entry.fields.is_empty() {
            out.push(b'\t');
            out.extend(self.format_fields(entry)?);
        }
        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), &entry.stack) {
            out.push(b'\n');
            out.extend_from_slice(stack.as_bytes());
        }
        out.extend_from_slice(cfg.line_ending.as_bytes());
        Ok(out)
    }

    fn name(&self) -> &str {
        "console"
    }
}
