//! End-of-run summary reporting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;

/// Counters accumulated over one driver invocation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_utc: DateTime<Utc>,
    pub comparisons: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_utc: Utc::now(),
            comparisons: 0,
            skipped: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn log(&self) {
        info!(
            "completed {} comparison(s), skipped {}, in {:.3}s (started {})",
            self.comparisons,
            self.skipped,
            self.elapsed.as_secs_f64(),
            self.started_utc.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
