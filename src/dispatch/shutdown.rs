//! Releases the writers a dispatch core was built with

use crate::core::{report_error, ErrorCallback, LoggerError, Result, WriteHandle};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Flushes then closes each distinct writer exactly once.
///
/// Several rules may share one writer; identity is the `Arc` pointer. The
/// first `shutdown` takes the writers, later calls find nothing left.
#[derive(Clone)]
pub struct ShutdownHandle {
    writers: Arc<Mutex<Vec<Arc<dyn WriteHandle>>>>,
    on_error: Option<ErrorCallback>,
}

fn identity(writer: &Arc<dyn WriteHandle>) -> usize {
    Arc::as_ptr(writer) as *const () as usize
}

impl ShutdownHandle {
    pub(crate) fn new(writers: Vec<Arc<dyn WriteHandle>>, on_error: Option<ErrorCallback>) -> Self {
        let mut seen = HashSet::new();
        let writers = writers
            .into_iter()
            .filter(|w| seen.insert(identity(w)))
            .collect();
        Self {
            writers: Arc::new(Mutex::new(writers)),
            on_error,
        }
    }

    /// A handle with nothing to release
    pub fn noop() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Flush then close every writer. Returns the first failure; every writer
    /// is still attempted and each failure is also reported to the callback.
    pub fn shutdown(&self) -> Result<()> {
        let writers = std::mem::take(&mut *self.writers.lock());
        let mut first_error: Option<LoggerError> = None;

        for writer in writers {
            let flushed = writer.flush();
            let closed = writer.close();
            if let Err(e) = flushed.and(closed) {
                let err = LoggerError::partial_write(writer.destination(), e);
                report_error(self.on_error.as_ref(), &err);
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Writers still waiting to be released
    pub fn pending(&self) -> usize {
        self.writers.lock().len()
    }

    /// Merge `other` into this handle; writers already held are not added twice
    #[must_use]
    pub fn join(self, other: ShutdownHandle) -> Self {
        let mut combined = std::mem::take(&mut *self.writers.lock());
        combined.extend(std::mem::take(&mut *other.writers.lock()));
        Self::new(combined, self.on_error.or(other.on_error))
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("pending", &self.pending())
            .finish()
    }
}
