//! # logit
//!
//! Field accumulation and level-dispatch routing for structured logging.
//!
//! ## Features
//!
//! - **Scoped fields**: a [`LogScope`] carries meta, ambient and per-severity
//!   fields for one unit of work, merged into every record without duplicates
//! - **Level dispatch**: [`DispatchRule`]s route each severity set to its own
//!   destination (`app.log`, `app.log.wf`, ...) with its own encoder
//! - **Rotation**: numbered, optionally gzipped backups with periodic flush
//! - **Failure isolation**: one broken destination never blocks the others
//!
//! ## Example
//!
//! ```no_run
//! use logit::prelude::*;
//! use std::sync::Arc;
//!
//! let rules = vec![
//!     DispatchRule::new("", [LogLevel::Debug, LogLevel::Info]),
//!     DispatchRule::new("wf", [LogLevel::Warn, LogLevel::Error, LogLevel::Fatal]),
//! ];
//! let (core, shutdown) =
//!     build_default_core("1hour", "logs/service.log", &rules, &WriterOptions::new())?;
//! let logger = Logger::builder().core(Arc::new(core)).shutdown(shutdown).build();
//!
//! let scope = LogScope::new();
//! scope.add_meta_field("logid", 1736330571);
//! scope.add_error([Field::string("stage", "payment")]);
//!
//! logger.info(&scope, "request accepted", vec![Field::string("path", "/pay")]);
//! logger.error(&scope, "request failed", vec![Field::int("status", 502)]);
//! logger.shutdown()?;
//! # Ok::<(), logit::LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod dispatch;
pub mod encoders;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{default_writer_factory, RotatingFileWriter, RotationStrategy};
    pub use crate::core::{
        Encoder, EncoderConfig, Field, FieldValue, LogCore, LogEntry, LogLevel, LogScope, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, Result, Tee, WriteHandle, WriterOptions,
    };
    pub use crate::dispatch::{
        build_default_core, build_dispatch_core, DispatchCore, DispatchRule, LevelFilter,
        ShutdownHandle,
    };
    pub use crate::encoders::{console_encoder, default_encoder, json_encoder};
}

pub use self::appenders::{
    default_writer_factory, ConsoleStream, ConsoleWriter, RotatingFileWriter, RotationPolicy,
    RotationStrategy,
};
pub use self::core::{
    global, init_global, Caller, DispatchMetrics, Encoder, EncoderConfig, EncoderFactory,
    ErrorCallback, Field, FieldStore, FieldValue, LevelEncoding, LogCore, LogEntry, LogLevel,
    LogScope, Logger, LoggerBuilder, LoggerConfig, LoggerError, OrderedFieldSet, Result, Tee,
    TimestampFormat, WriteHandle, WriterFactory, WriterOptions,
};
pub use dispatch::{
    build_default_core, build_dispatch_core, normalize_suffix, DispatchCore, DispatchRule,
    LevelFilter, ShutdownHandle, SubCore,
};
pub use encoders::{console_encoder, default_encoder, json_encoder, ConsoleEncoder, JsonEncoder};
