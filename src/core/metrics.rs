//! Handler metrics for observability
//!
//! Counters for records dispatched, events rejected by strict mode, sink
//! failures, console formatting fallbacks and disabled-output notices.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by a handler and every handler derived from it
///
/// # Example
///
/// ```
/// use mango_logger::core::HandlerMetrics;
///
/// let metrics = HandlerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.dispatched(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug)]
pub struct HandlerMetrics {
    /// Records that reached the sink fan-out
    dispatched: AtomicU64,

    /// Events rejected by strict-mode validation
    validation_failures: AtomicU64,

    /// Sink calls that returned an error
    sink_failures: AtomicU64,

    /// Console lines printed raw because the filter failed
    format_fallbacks: AtomicU64,

    /// Events dropped because output was disabled
    disabled_notices: AtomicU64,
}

impl HandlerMetrics {
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            format_fallbacks: AtomicU64::new(0),
            disabled_notices: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn validation_failures(&self) -> u64 {
        self.validation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_fallbacks(&self) -> u64 {
        self.format_fallbacks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn disabled_notices(&self) -> u64 {
        self.disabled_notices.load(Ordering::Relaxed)
    }

    /// Record a dispatched record, returning the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_validation_failure(&self) -> u64 {
        self.validation_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_format_fallback(&self) -> u64 {
        self.format_fallbacks.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_disabled_notice(&self) -> u64 {
        self.disabled_notices.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of dispatched records that hit at least one failing sink (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been dispatched.
    pub fn failure_rate(&self) -> f64 {
        let dispatched = self.dispatched() as f64;
        if dispatched == 0.0 {
            0.0
        } else {
            (self.sink_failures() as f64 / dispatched * 100.0).min(100.0)
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
        self.validation_failures.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.format_fallbacks.store(0, Ordering::Relaxed);
        self.disabled_notices.store(0, Ordering::Relaxed);
    }
}

impl Default for HandlerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HandlerMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched()),
            validation_failures: AtomicU64::new(self.validation_failures()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            format_fallbacks: AtomicU64::new(self.format_fallbacks()),
            disabled_notices: AtomicU64::new(self.disabled_notices()),
        }
    }
}
