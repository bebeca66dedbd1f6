//! # Sync Metrics
//!
//! Counters and timings for reconciliation passes.
//!
//! ## Features
//!
//! - **Pass Counters**: synchronized, skipped while offline, aborted
//! - **Timing**: last and rolling average duration of synchronized passes
//! - **Record Counters**: promotions, pushes and confirmed deletes

use crate::client::offline::{ReconciliationReport, ReconciliationResult};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    pub total_passes: u64,
    pub successful_passes: u64,
    pub offline_passes: u64,
    pub aborted_passes: u64,
    pub average_pass_duration: Duration,
    pub last_pass_duration: Option<Duration>,
    pub tasks_promoted: u64,
    pub tasks_pushed: u64,
    pub deletes_confirmed: u64,
    pub record_failures: u64,
    last_pass_start: Option<Instant>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass_start(&mut self) {
        self.last_pass_start = Some(Instant::now());
        self.total_passes += 1;
    }

    /// Fold the outcome of the pass started by the last `record_pass_start`
    pub fn record_pass_end(&mut self, result: &ReconciliationResult) {
        let duration = self.last_pass_start.take().map(|start| start.elapsed());
        match result {
            ReconciliationResult::Synchronized(report) => {
                self.successful_passes += 1;
                self.record_report(report);
                if let Some(duration) = duration {
                    self.last_pass_duration = Some(duration);
                    // Rolling average over synchronized passes
                    let n = u32::try_from(self.successful_passes).unwrap_or(u32::MAX);
                    let total = self.average_pass_duration * (n - 1) + duration;
                    self.average_pass_duration = total / n;
                }
            }
            ReconciliationResult::Offline(_) => self.offline_passes += 1,
            ReconciliationResult::Aborted { .. } => self.aborted_passes += 1,
        }
    }

    fn record_report(&mut self, report: &ReconciliationReport) {
        self.tasks_promoted += report.promoted as u64;
        self.tasks_pushed += report.pushed as u64;
        self.deletes_confirmed += report.deletes_confirmed as u64;
        self.record_failures += (report.failed + report.deletes_deferred) as u64;
    }

    /// Share of started passes that synchronized
    pub fn success_rate(&self) -> f64 {
        if self.total_passes == 0 {
            0.0
        } else {
            self.successful_passes as f64 / self.total_passes as f64
        }
    }
}
