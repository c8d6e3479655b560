//! Write handle trait for log destinations

use super::error::{LoggerError, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Receives errors raised while writing, flushing or rotating
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// A physical destination shared by every sub-core that routes to it.
///
/// Methods take `&self`; implementations synchronize internally so one handle
/// can back several dispatch rules.
pub trait WriteHandle: Send + Sync {
    fn write_all(&self, buf: &[u8]) -> Result<()>;
    fn flush(&self) -> Result<()>;
    /// Flush and release the underlying resource. Later writes fail.
    fn close(&self) -> Result<()>;
    fn destination(&self) -> &str;
}

/// `(rule_set_name, destination, options)` → write handle
pub type WriterFactory =
    Arc<dyn Fn(&str, &str, &WriterOptions) -> Result<Arc<dyn WriteHandle>> + Send + Sync>;

/// Default buffer capacity for file writers
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Default number of rotated files kept next to the live one
pub const DEFAULT_MAX_FILES: usize = 5;

/// Options handed through to the writer factory
///
/// # Example
///
/// ```
/// use logit::WriterOptions;
/// use std::time::Duration;
///
/// let options = WriterOptions::new()
///     .with_max_files(48)
///     .with_flush_interval(Duration::from_secs(1));
/// assert_eq!(options.max_files, 48);
/// ```
#[derive(Clone)]
pub struct WriterOptions {
    pub on_error: Option<ErrorCallback>,
    /// Flush buffered bytes at this interval
    pub flush_interval: Option<Duration>,
    /// Re-create the file at this interval if it was removed externally
    pub check_interval: Option<Duration>,
    /// Rotated files to keep
    pub max_files: usize,
    /// Rotated files older than this are deleted at the next rotation
    pub max_age: Option<Duration>,
    pub buffer_size: usize,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            on_error: None,
            flush_interval: None,
            check_interval: None,
            max_files: DEFAULT_MAX_FILES,
            max_age: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            compress: false,
        }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = Some(interval);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = Some(age);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Hand `err` to the error callback, or stderr when none is set
    pub fn report(&self, err: &LoggerError) {
        report_error(self.on_error.as_ref(), err);
    }
}

impl fmt::Debug for WriterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterOptions")
            .field("on_error", &self.on_error.as_ref().map(|_| "<callback>"))
            .field("flush_interval", &self.flush_interval)
            .field("check_interval", &self.check_interval)
            .field("max_files", &self.max_files)
            .field("max_age", &self.max_age)
            .field("buffer_size", &self.buffer_size)
            .field("compress", &self.compress)
            .finish()
    }
}

/// The logger cannot log its own failures through itself; without a callback
/// they go to stderr.
pub(crate) fn report_error(callback: Option<&ErrorCallback>, err: &LoggerError) {
    match callback {
        Some(callback) => callback(err),
        None => eprintln!("[LOGGER ERROR] {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults() {
        let options = WriterOptions::default();
        assert_eq!(options.max_files, DEFAULT_MAX_FILES);
        assert!(options.max_age.is_none());
        assert_eq!(options.buffer_size, DEFAULT_BUFFER_SIZE);
        assert!(options.flush_interval.is_none());
        assert!(!options.compress);
    }

    #[test]
    fn test_report_uses_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = WriterOptions::new().with_on_error(Arc::new(move |_: &LoggerError| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        options.report(&LoggerError::writer("disk full"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(format!("{:?}", options).contains("<callback>"));
    }
}
