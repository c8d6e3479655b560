//! Fan-out core: one (encoder, writer, filter) triple per rule

use super::level_filter::LevelFilter;
use crate::core::{
    report_error, DispatchMetrics, Encoder, ErrorCallback, LogCore, LogEntry, LogLevel,
    LoggerError, Result, WriteHandle,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// One destination inside a [`DispatchCore`]
pub struct SubCore {
    encoder: Box<dyn Encoder>,
    writer: Arc<dyn WriteHandle>,
    filter: LevelFilter,
}

impl SubCore {
    pub fn new(encoder: Box<dyn Encoder>, writer: Arc<dyn WriteHandle>, filter: LevelFilter) -> Self {
        Self {
            encoder,
            writer,
            filter,
        }
    }

    pub fn filter(&self) -> &LevelFilter {
        &self.filter
    }

    pub fn destination(&self) -> &str {
        self.writer.destination()
    }

    pub fn encoder_name(&self) -> &str {
        self.encoder.name()
    }

    fn deliver(&self, entry: &LogEntry) -> Result<()> {
        let bytes = self.encoder.encode(entry)?;
        self.writer.write_all(&bytes)
    }
}

/// Delivers each record to every sub-core whose filter accepts its severity.
///
/// Sub-cores are isolated from each other: an encode error, a write error or a
/// panic in one is reported to the error callback and the rest still receive
/// the record.
pub struct DispatchCore {
    subs: Vec<SubCore>,
    on_error: Option<ErrorCallback>,
    metrics: DispatchMetrics,
}

impl DispatchCore {
    pub fn new(subs: Vec<SubCore>, on_error: Option<ErrorCallback>) -> Self {
        Self {
            subs,
            on_error,
            metrics: DispatchMetrics::new(),
        }
    }

    pub fn sub_cores(&self) -> &[SubCore] {
        &self.subs
    }

    /// Destinations that would receive a record at `level`
    pub fn destinations_for(&self, level: LogLevel) -> Vec<&str> {
        self.subs
            .iter()
            .filter(|sub| sub.filter.accepts(level))
            .map(SubCore::destination)
            .collect()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    fn report(&self, err: LoggerError) {
        report_error(self.on_error.as_ref(), &err);
    }
}

impl LogCore for DispatchCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.subs.iter().any(|sub| sub.filter.accepts(level))
    }

    fn log(&self, entry: &LogEntry) {
        for sub in self.subs.iter().filter(|sub| sub.filter.accepts(entry.level)) {
            match catch_unwind(AssertUnwindSafe(|| sub.deliver(entry))) {
                Ok(Ok(())) => {
                    self.metrics.record_written();
                }
                Ok(Err(e)) => {
                    self.metrics.record_failed();
                    self.report(LoggerError::partial_write(sub.destination(), e));
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    self.metrics.record_panicked();
                    self.report(LoggerError::partial_write(
                        sub.destination(),
                        LoggerError::other(format!("{} panicked: {}", sub.encoder.name(), panic_msg)),
                    ));
                }
            }
        }
    }

    /// Flushes each distinct destination; the first failure is returned
    fn sync(&self) -> Result<()> {
        let mut first_error: Option<LoggerError> = None;
        let mut flushed: Vec<*const ()> = Vec::with_capacity(self.subs.len());

        for sub in &self.subs {
            let id = Arc::as_ptr(&sub.writer) as *const ();
            if flushed.contains(&id) {
                continue;
            }
            flushed.push(id);

            if let Err(e) = sub.writer.flush() {
                first_error.get_or_insert(LoggerError::partial_write(sub.destination(), e));
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
