//! Process-wide counters for analysis runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before the CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    runs_started: AtomicU64,
    runs_complete: AtomicU64,
    runs_degraded: AtomicU64,
    runs_failed: AtomicU64,
    generator_calls: AtomicU64,
    review_rejections: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_complete: AtomicU64::new(0),
            runs_degraded: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            generator_calls: AtomicU64::new(0),
            review_rejections: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_complete(&self) {
        self.runs_complete.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_degraded(&self) {
        self.runs_degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the model-invocation counter by one.
    pub fn inc_generator_calls(&self) {
        self.generator_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "generator_calls", "counter incremented");
    }

    pub fn inc_review_rejections(&self) {
        self.review_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            runs_complete = self.runs_complete(),
            runs_degraded = self.runs_degraded(),
            runs_failed = self.runs_failed(),
            generator_calls = self.generator_calls(),
            review_rejections = self.review_rejections(),
        );
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn runs_complete(&self) -> u64 {
        self.runs_complete.load(Ordering::Relaxed)
    }

    pub fn runs_degraded(&self) -> u64 {
        self.runs_degraded.load(Ordering::Relaxed)
    }

    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }

    pub fn generator_calls(&self) -> u64 {
        self.generator_calls.load(Ordering::Relaxed)
    }

    pub fn review_rejections(&self) -> u64 {
        self.review_rejections.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_counters_increment() {
        let m = Metrics::new();
        m.inc_runs_started();
        m.inc_generator_calls();
        m.inc_generator_calls();
        m.inc_runs_degraded();
        assert_eq!(m.runs_started(), 1);
        assert_eq!(m.generator_calls(), 2);
        assert_eq!(m.runs_degraded(), 1);
        assert_eq!(m.runs_complete(), 0);
        m.flush();
    }
}
