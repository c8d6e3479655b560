//! Core logger types and traits

pub mod encoder;
pub mod error;
pub mod field;
pub mod field_store;
pub mod log_core;
pub mod log_entry;
pub mod log_level;
pub mod log_scope;
pub mod logger;
mod merge;
pub mod metrics;
pub mod ordered_fields;
pub mod timestamp;
pub mod writer;

pub use encoder::{Encoder, EncoderConfig, EncoderFactory, LevelEncoding};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use field_store::FieldStore;
pub use log_core::{LogCore, Tee};
pub use log_entry::{Caller, LogEntry};
pub use log_level::LogLevel;
pub use log_scope::LogScope;
pub use logger::{global, init_global, Logger, LoggerBuilder, LoggerConfig};
pub use metrics::DispatchMetrics;
pub use ordered_fields::OrderedFieldSet;
pub use timestamp::TimestampFormat;
pub use writer::{
    ErrorCallback, WriteHandle, WriterFactory, WriterOptions, DEFAULT_BUFFER_SIZE,
    DEFAULT_MAX_FILES,
};

pub(crate) use writer::report_error;
