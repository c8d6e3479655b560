//! Main logger implementation

use super::{
    encoder::EncoderConfig,
    error::{LoggerError, Result},
    field::Field,
    log_core::{LogCore, Tee},
    log_entry::{Caller, LogEntry},
    log_level::LogLevel,
    log_scope::LogScope,
    writer::WriterOptions,
};
use crate::dispatch::{build_dispatch_core, DispatchRule, LevelFilter, ShutdownHandle};
use crate::encoders::{console_encoder, json_encoder};
use serde::Deserialize;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Bytes per megabyte for [`LoggerConfig::max_size`]
const MEGABYTE: u64 = 1024 * 1024;

const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Merges scope fields into each record and hands it to a [`LogCore`].
///
/// Emit methods take the unit-of-work's [`LogScope`] explicitly; a scope
/// without a store still logs, with only the call-site fields.
///
/// # Example
///
/// ```no_run
/// use logit::prelude::*;
///
/// let logger = Logger::from_config(&LoggerConfig {
///     filename: "./app.log".to_string(),
///     level: "debug".to_string(),
///     ..LoggerConfig::default()
/// })
/// .unwrap();
///
/// let scope = LogScope::new();
/// scope.add_meta_field("host", "127.0.0.1");
/// logger.info(&scope, "service started", vec![Field::string("service", "billing")]);
/// logger.shutdown().unwrap();
/// ```
pub struct Logger {
    core: Arc<dyn LogCore>,
    name: Option<String>,
    add_caller: bool,
    stacktrace_level: Option<LogLevel>,
    shutdown: ShutdownHandle,
}

impl Logger {
    /// Create a new builder for configuring a Logger
    ///
    /// # Example
    ///
    /// ```
    /// use logit::{Logger, LogLevel};
    ///
    /// let logger = Logger::builder()
    ///     .name("worker")
    ///     .stacktrace_level(LogLevel::Fatal)
    ///     .build();
    /// assert_eq!(logger.name(), Some("worker"));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a file logger, plus a console tee when `to_stdout` is set.
    ///
    /// Every severity at or above `config.level` goes to `config.filename`.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        if config.filename.trim().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "filename must not be empty"));
        }

        let level = config.min_level();
        let mut options = WriterOptions::new()
            .with_max_files(config.max_backups)
            .with_compression(config.compress);
        if let Some(age) = config.backup_max_age() {
            options = options.with_max_age(age);
        }
        let rules = [DispatchRule::new("", level.and_above())
            .with_encoder(json_encoder(EncoderConfig::file()))];

        let (file_core, shutdown) = build_dispatch_core(
            &config.rule_set_name(),
            &config.filename,
            &rules,
            None,
            None,
            &options,
        )?;

        let mut builder = Logger::builder().shutdown(shutdown);
        if let Some(name) = &config.name {
            builder = builder.name(name.clone());
        }

        if config.to_stdout {
            let console_rules = [DispatchRule::new("", level.and_above())
                .with_encoder(console_encoder(EncoderConfig::dispatch().with_colors(true)))];
            let (console_core, console_shutdown) =
                build_dispatch_core("never", "stdout", &console_rules, None, None, &options)?;
            let tee = Tee::new(vec![Arc::new(file_core) as Arc<dyn LogCore>, Arc::new(console_core)]);
            builder = builder.core(Arc::new(tee)).join_shutdown(console_shutdown);
        } else {
            builder = builder.core(Arc::new(file_core));
        }

        Ok(builder.build())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn core(&self) -> &Arc<dyn LogCore> {
        &self.core
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.enabled(level)
    }

    #[track_caller]
    pub fn debug(&self, scope: &LogScope, message: impl AsRef<str>, fields: Vec<Field>) {
        self.output(scope, LogLevel::Debug, message, fields);
    }

    #[track_caller]
    pub fn info(&self, scope: &LogScope, message: impl AsRef<str>, fields: Vec<Field>) {
        self.output(scope, LogLevel::Info, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, scope: &LogScope, message: impl AsRef<str>, fields: Vec<Field>) {
        self.output(scope, LogLevel::Warn, message, fields);
    }

    #[track_caller]
    pub fn error(&self, scope: &LogScope, message: impl AsRef<str>, fields: Vec<Field>) {
        self.output(scope, LogLevel::Error, message, fields);
    }

    /// Written like any other severity; unwinding is left to the caller
    #[track_caller]
    pub fn panic(&self, scope: &LogScope, message: impl AsRef<str>, fields: Vec<Field>) {
        self.output(scope, LogLevel::Panic, message, fields);
    }

    /// Written like any other severity; the process is not terminated
    #[track_caller]
    pub fn fatal(&self, scope: &LogScope, message: impl AsRef<str>, fields: Vec<Field>) {
        self.output(scope, LogLevel::Fatal, message, fields);
    }

    /// Merge the scope's fields for `level` with `fields` and emit one record
    #[track_caller]
    pub fn output(&self, scope: &LogScope, level: LogLevel, message: impl AsRef<str>, fields: Vec<Field>) {
        if !self.core.enabled(level) {
            return;
        }
        let caller = Location::caller();
        let merged = scope.merge(level, fields);
        self.core.log(&self.entry(level, message.as_ref(), merged, caller));
    }

    fn entry(
        &self,
        level: LogLevel,
        message: &str,
        fields: Vec<Field>,
        caller: &'static Location<'static>,
    ) -> LogEntry {
        let mut entry = LogEntry::new(level, message).with_fields(fields);
        if let Some(name) = &self.name {
            entry = entry.with_logger_name(name.clone());
        }
        if self.add_caller {
            entry = entry.with_caller(Caller::from(caller));
        }
        if self.stacktrace_level.is_some_and(|min| level >= min) {
            entry = entry.with_stack(Backtrace::force_capture().to_string());
        }
        entry
    }

    /// Emit one record with an empty message for each severity bucket present
    /// in the scope, lowest severity first. Emptied buckets still emit.
    #[track_caller]
    pub fn flush(&self, scope: &LogScope) {
        for level in scope.present_levels() {
            self.output(scope, level, "", Vec::new());
        }
    }

    /// Flush every destination
    pub fn sync(&self) -> Result<()> {
        self.core.sync()
    }

    /// Sync, then flush and close the destinations this logger owns.
    ///
    /// Later calls are no-ops; records emitted afterwards are reported as
    /// write failures.
    pub fn shutdown(&self) -> Result<()> {
        let synced = self.sync();
        self.shutdown.shutdown()?;
        synced
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Destinations may be shared with other loggers; only flush here
        if let Err(e) = self.core.sync() {
            eprintln!("[LOGGER ERROR] Failed to flush during drop: {}", e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// Without a core the logger discards every record.
///
/// # Example
/// ```no_run
/// use logit::prelude::*;
/// use std::sync::Arc;
///
/// let rules = vec![
///     DispatchRule::new("", [LogLevel::Debug, LogLevel::Info]),
///     DispatchRule::new("wf", [LogLevel::Warn, LogLevel::Error]),
/// ];
/// let (core, shutdown) =
///     build_default_core("daily", "/var/log/app.log", &rules, &WriterOptions::new()).unwrap();
///
/// let logger = Logger::builder()
///     .core(Arc::new(core))
///     .shutdown(shutdown)
///     .name("api")
///     .add_caller(true)
///     .stacktrace_level(LogLevel::Error)
///     .build();
/// ```
pub struct LoggerBuilder {
    core: Option<Arc<dyn LogCore>>,
    shutdown: ShutdownHandle,
    name: Option<String>,
    add_caller: bool,
    stacktrace_level: Option<LogLevel>,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: None,
            shutdown: ShutdownHandle::noop(),
            name: None,
            add_caller: true,
            stacktrace_level: Some(LogLevel::Error),
        }
    }

    #[must_use]
    pub fn core(mut self, core: Arc<dyn LogCore>) -> Self {
        self.core = Some(core);
        self
    }

    /// Handle released by [`Logger::shutdown`]
    #[must_use]
    pub fn shutdown(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown = handle;
        self
    }

    #[must_use]
    pub fn join_shutdown(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown = self.shutdown.join(handle);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record the emitting call site (default: on)
    #[must_use]
    pub fn add_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    /// Capture a stack trace at `level` and above (default: Error)
    #[must_use]
    pub fn stacktrace_level(mut self, level: LogLevel) -> Self {
        self.stacktrace_level = Some(level);
        self
    }

    #[must_use]
    pub fn without_stacktrace(mut self) -> Self {
        self.stacktrace_level = None;
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            core: self.core.unwrap_or_else(|| Arc::new(Tee::default())),
            name: self.name,
            add_caller: self.add_caller,
            stacktrace_level: self.stacktrace_level,
            shutdown: self.shutdown,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// File logger settings, typically read from a config file
///
/// ```
/// use logit::LoggerConfig;
///
/// let config: LoggerConfig = serde_json::from_str(
///     r#"{"filename": "./app.log", "level": "debug", "max_backups": 10, "compress": true}"#,
/// )
/// .unwrap();
/// assert_eq!(config.rule_set_name(), "size:104857600");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub filename: String,
    /// `debug`, `info`, `warn`, `error`, `panic` or `fatal`; anything else is `info`
    pub level: String,
    /// Rotation rule (`1hour`, `daily`, `size:<bytes>`, ...); size-based when unset
    pub rotation: Option<String>,
    /// Megabytes before a size-based rotation
    pub max_size: u64,
    pub max_backups: usize,
    /// Days to keep rotated files; 0 keeps them until `max_backups` pushes them out
    pub max_age: u64,
    pub compress: bool,
    pub to_stdout: bool,
    pub name: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filename: "app.log".to_string(),
            level: "info".to_string(),
            rotation: None,
            max_size: 100,
            max_backups: crate::core::writer::DEFAULT_MAX_FILES,
            max_age: 0,
            compress: false,
            to_stdout: false,
            name: None,
        }
    }
}

impl LoggerConfig {
    pub fn min_level(&self) -> LogLevel {
        self.level.parse().unwrap_or(LogLevel::Info)
    }

    /// Severities the file destination accepts
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::at_least(self.min_level())
    }

    /// `max_age` as a duration, `None` when unset
    pub fn backup_max_age(&self) -> Option<Duration> {
        (self.max_age > 0).then(|| Duration::from_secs(self.max_age * SECONDS_PER_DAY))
    }

    pub fn rule_set_name(&self) -> String {
        match &self.rotation {
            Some(rule) => rule.clone(),
            None => format!("size:{}", self.max_size.max(1) * MEGABYTE),
        }
    }
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install the process-wide logger. Succeeds once.
pub fn init_global(logger: Logger) -> Result<()> {
    GLOBAL.set(logger).map_err(|_| LoggerError::AlreadyInitialized)
}

/// The process-wide logger, if [`init_global`] has run
pub fn global() -> Option<&'static Logger> {
    GLOBAL.get()
}
