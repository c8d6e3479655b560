//! Delivery counters for a dispatch core
//!
//! Every sub-core delivery is counted once: as written, as failed (encode or
//! write error), or as panicked.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for dispatch health
///
/// # Example
///
/// ```
/// use logit::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_written();
/// metrics.record_failed();
///
/// assert_eq!(metrics.written(), 1);
/// assert_eq!(metrics.failed(), 1);
/// assert_eq!(metrics.failure_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Deliveries that reached their writer
    written: AtomicU64,

    /// Deliveries lost to an encode or write error
    failed: AtomicU64,

    /// Deliveries lost to a panicking encoder or writer
    panicked: AtomicU64,
}

impl DispatchMetrics {
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_panicked(&self) -> u64 {
        self.panicked.fetch_add(1, Ordering::Relaxed)
    }

    /// Lost deliveries as a percentage (0.0 - 100.0); 0.0 before any delivery
    pub fn failure_rate(&self) -> f64 {
        let lost = (self.failed() + self.panicked()) as f64;
        let total = self.written() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.written.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.panicked.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            written: AtomicU64::new(self.written()),
            failed: AtomicU64::new(self.failed()),
            panicked: AtomicU64::new(self.panicked()),
        }
    }
}
