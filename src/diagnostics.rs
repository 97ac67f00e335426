use chrono::{DateTime, Utc};
use tracing::debug;

/// Wall-clock start point. `std::time::Instant` is unavailable on wasm32.
#[derive(Debug, Clone, Copy)]
pub struct PerfTimer(DateTime<Utc>);

impl PerfTimer {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.0).num_milliseconds().max(0)
    }
}

#[inline]
pub fn log_perf(scope: &str, started_at: PerfTimer, details: &str) {
    let elapsed_ms = started_at.elapsed_ms();
    if details.trim().is_empty() {
        debug!(target: "perf", scope, elapsed_ms, "timing");
    } else {
        debug!(target: "perf", scope, elapsed_ms, details, "timing");
    }
}
