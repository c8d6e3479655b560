//! The emission seam between a [`Logger`](crate::Logger) and its destinations

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use std::sync::Arc;

/// Receives fully merged records.
///
/// `log` does not return an error: destination failures are reported through
/// the core's own error callback so one emit never fails the caller.
pub trait LogCore: Send + Sync {
    /// Whether any destination would accept `level`
    fn enabled(&self, level: LogLevel) -> bool;

    fn log(&self, entry: &LogEntry);

    /// Flush every destination
    fn sync(&self) -> Result<()>;
}

/// Hands each record to several cores in turn
///
/// # Example
///
/// ```
/// use logit::{LogCore, Tee};
///
/// let tee = Tee::new(Vec::new());
/// assert!(tee.is_empty());
/// assert!(tee.sync().is_ok());
/// ```
#[derive(Clone, Default)]
pub struct Tee {
    cores: Vec<Arc<dyn LogCore>>,
}

impl Tee {
    pub fn new(cores: Vec<Arc<dyn LogCore>>) -> Self {
        Self { cores }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_core(mut self, core: Arc<dyn LogCore>) -> Self {
        self.cores.push(core);
        self
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

impl LogCore for Tee {
    fn enabled(&self, level: LogLevel) -> bool {
        self.cores.iter().any(|core| core.enabled(level))
    }

    fn log(&self, entry: &LogEntry) {
        for core in &self.cores {
            if core.enabled(entry.level) {
                core.log(entry);
            }
        }
    }

    /// Syncs every core; the first error is returned after all have been tried
    fn sync(&self) -> Result<()> {
        let mut first_error: Option<LoggerError> = None;
        for core in &self.cores {
            if let Err(e) = core.sync() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
