//! Log entry structure

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::Location;

/// Source location of the emit call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    pub fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// `parent_dir/file.rs:line`, the trailing two path components only
    pub fn short(&self) -> String {
        let mut parts = self.file.rsplitn(3, ['/', '\\']);
        let file = parts.next().unwrap_or(self.file);
        match parts.next() {
            Some(dir) => format!("{}/{}:{}", dir, file, self.line),
            None => format!("{}:{}", file, self.line),
        }
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One record, after field merging, as handed to a `LogCore`
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<Field>,
    pub logger_name: Option<String>,
    pub caller: Option<Caller>,
    pub stack: Option<String>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Utc::now(),
            fields: Vec::new(),
            logger_name: None,
            caller: None,
            stack: None,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "line one\nERROR fake\tentry\r");
        assert_eq!(entry.message, "line one\\nERROR fake\\tentry\\r");
    }

    #[test]
    fn test_caller_short_form() {
        assert_eq!(Caller::new("src/core/logger.rs", 42).short(), "core/logger.rs:42");
        assert_eq!(Caller::new("main.rs", 7).short(), "main.rs:7");
        assert_eq!(Caller::new("/a/b/c/d.rs", 1).to_string(), "/a/b/c/d.rs:1");
    }

    #[test]
    fn test_field_lookup() {
        let entry = LogEntry::new(LogLevel::Warn, "slow")
            .with_fields(vec![Field::new("elapsed_ms", 900)]);
        assert!(entry.field("elapsed_ms").is_some());
        assert!(entry.field("missing").is_none());
    }
}
