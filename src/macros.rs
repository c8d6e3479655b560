//! Logging macros with `format!`-style messages.
//!
//! Every macro takes the logger and the unit-of-work scope first. Call-site
//! fields go in an optional bracketed list before the message.
//!
//! # Examples
//!
//! ```
//! use logit::prelude::*;
//! use logit::{error, info};
//!
//! let logger = Logger::builder().build();
//! let scope = LogScope::new();
//!
//! info!(logger, &scope, "Server started");
//!
//! let port = 8080;
//! info!(logger, &scope, "Server listening on port {}", port);
//!
//! error!(logger, &scope, [Field::int("status", 500)], "Request failed: {}", "timeout");
//! ```

/// Emit at an explicit level.
///
/// # Examples
///
/// ```
/// # use logit::prelude::*;
/// # let logger = Logger::builder().build();
/// # let scope = LogScope::detached();
/// use logit::log;
/// log!(logger, &scope, LogLevel::Info, "Simple message");
/// log!(logger, &scope, LogLevel::Error, [Field::string("op", "save")], "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $scope:expr, $level:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.output($scope, $level, format!($($arg)+), vec![$($field),*])
    };
    ($logger:expr, $scope:expr, $level:expr, $($arg:tt)+) => {
        $logger.output($scope, $level, format!($($arg)+), ::std::vec::Vec::new())
    };
}

/// Emit at debug level.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $scope:expr, $($arg:tt)+) => {
        $crate::log!($logger, $scope, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Emit at info level.
///
/// Info is the only level that also carries the scope's ambient fields.
#[macro_export]
macro_rules! info {
    ($logger:expr, $scope:expr, $($arg:tt)+) => {
        $crate::log!($logger, $scope, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Emit at warn level.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $scope:expr, $($arg:tt)+) => {
        $crate::log!($logger, $scope, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Emit at error level.
#[macro_export]
macro_rules! error {
    ($logger:expr, $scope:expr, $($arg:tt)+) => {
        $crate::log!($logger, $scope, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Emit at fatal level. The process keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $scope:expr, $($arg:tt)+) => {
        $crate::log!($logger, $scope, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Field, LogCore, LogEntry, LogLevel, LogScope, Logger, Result};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Capture {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl LogCore for Capture {
        fn enabled(&self, _level: LogLevel) -> bool {
            true
        }

        fn log(&self, entry: &LogEntry) {
            self.entries.lock().push(entry.clone());
        }

        fn sync(&self) -> Result<()> {
            Ok(())
        }
    }

    fn logger() -> (Logger, Arc<Capture>) {
        let capture = Arc::new(Capture::default());
        let logger = Logger::builder()
            .core(capture.clone())
            .without_stacktrace()
            .build();
        (logger, capture)
    }

    #[test]
    fn test_level_macros() {
        let (logger, capture) = logger();
        let scope = LogScope::new();

        debug!(logger, &scope, "debug {}", 1);
        info!(logger, &scope, "info");
        warn!(logger, &scope, "warn {} {}", "a", "b");
        error!(logger, &scope, "error");
        fatal!(logger, &scope, "fatal");

        let entries = capture.entries.lock();
        let levels: Vec<LogLevel> = entries.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error, LogLevel::Fatal]
        );
        assert_eq!(entries[0].message, "debug 1");
        assert_eq!(entries[2].message, "warn a b");
    }

    #[test]
    fn test_fields_list() {
        let (logger, capture) = logger();
        let scope = LogScope::new();
        scope.add_meta_field("logid", 9);

        info!(logger, &scope, [Field::string("user", "tom"), Field::int("age", 30)], "user {}", "seen");

        let entries = capture.entries.lock();
        let keys: Vec<&str> = entries[0].fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["logid", "user", "age"]);
        assert_eq!(entries[0].message, "user seen");
    }

    #[test]
    fn test_caller_points_at_macro_site() {
        let (logger, capture) = logger();
        log!(logger, &LogScope::detached(), LogLevel::Warn, "located");

        let entries = capture.entries.lock();
        assert!(entries[0].caller.is_some_and(|c| c.file.ends_with("macros.rs")));
    }
}
