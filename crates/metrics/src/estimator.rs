//! Run-time, progress, ETA, and credit estimation for one work unit.

use std::sync::Arc;

use gridbot_core::{Clock, SystemClock, SEC_PER_DAY};
use gridbot_data::UnitData;
use tracing::{debug, warn};

/// Longest gap, in seconds, between two skew-timer ticks that still counts
/// as normal elapsed time. Anything longer (or negative) is treated as a
/// clock anomaly and folded into the skew accumulator.
const MAX_TICK_GAP: i64 = 300;

/// Timing, progress, and credit estimator for a single work unit.
///
/// Converts sparse progress reports from the compute engine plus wall-clock
/// observations into continuously updated estimates. Elapsed time is
/// corrected for system sleep, stalls, and clock changes via the skew
/// accumulator, so only normally elapsed seconds count as run time.
///
/// The instance holds no internal synchronization; the owning job object
/// must serialize calls from its timer, status, and progress-report paths.
pub struct UnitMetrics {
    clock: Arc<dyn Clock>,

    process_start_time: u64,
    last_skew_timer: u64,
    clock_skew: i64,

    last_known_done: u64,
    last_known_total: u64,
    last_known_progress_update: u64,
    last_known_progress_update_run_time: u64,
}

impl UnitMetrics {
    /// Create an estimator reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            process_start_time: 0,
            last_skew_timer: 0,
            clock_skew: 0,
            last_known_done: 0,
            last_known_total: 0,
            last_known_progress_update: 0,
            last_known_progress_update_run_time: 0,
        }
    }

    /// Reset all metric data to its initial state.
    pub fn reset(&mut self) {
        self.process_start_time = 0;
        self.last_skew_timer = 0;
        self.clock_skew = 0;

        self.last_known_done = 0;
        self.last_known_total = 0;
        self.last_known_progress_update = 0;
        self.last_known_progress_update_run_time = 0;
    }

    /// Record that the compute process (re)started now.
    pub fn process_started(&mut self) {
        let now = self.clock.now();
        self.process_start_time = now;
        self.last_skew_timer = now;
        self.last_known_done = 0;
        self.last_known_total = 0;
        self.last_known_progress_update = 0;
        self.clock_skew = 0;
    }

    /// Record that the compute process ended.
    ///
    /// The caller persists `run_time` (the current total) before calling
    /// this; the estimator retains nothing across process instances.
    pub fn process_ended(&mut self, run_time: u64) {
        debug!(run_time, "compute process ended");
        self.process_start_time = 0;
    }

    /// Periodic tick that detects and absorbs clock anomalies.
    ///
    /// Call every few seconds while the compute process runs. A tick delta
    /// that is negative or longer than the expected interval window means
    /// the host slept, stalled, or had its clock changed; that delta is
    /// accumulated into the skew so run-time queries can subtract it out.
    pub fn skew_timer(&mut self) {
        let now = self.clock.now();

        let delta = now as i64 - self.last_skew_timer as i64;
        if delta < 0 || MAX_TICK_GAP < delta {
            warn!(
                delta,
                "clock skew, I/O delay, hibernation or other slowdown \
                 detected, adjusting time estimates"
            );
            self.clock_skew += delta;
        }

        self.last_skew_timer = now;
    }

    /// Skew-corrected run time of the current process instance, in seconds.
    ///
    /// Zero when no process is running. Can go negative when the clock
    /// stepped backward; [`Self::run_time`] clamps the total.
    pub fn run_time_delta(&self) -> i64 {
        if self.process_start_time == 0 {
            return 0;
        }
        self.clock.now() as i64 - self.process_start_time as i64 - self.clock_skew
    }

    /// Total run time across all process instances of this unit.
    ///
    /// `stored_run_time` is the caller-persisted total from previous
    /// instances; the live delta of the current instance is added on top.
    pub fn run_time(&self, stored_run_time: u64) -> u64 {
        let run_time = stored_run_time as i64 + self.run_time_delta();
        if 0 < run_time {
            run_time as u64
        } else {
            0
        }
    }

    /// Best available estimate of the unit's total run time, in seconds.
    pub fn run_time_estimate(&self, data: &dyn UnitData) -> u64 {
        // If valid, use the estimate provided by the work server
        let estimate = data.u64_or("wu.estimate", 0);
        if estimate != 0 {
            return estimate;
        }

        // Make our own estimate
        let known = self.known_progress();
        if known > 0.0 && self.last_known_progress_update_run_time != 0 {
            return (self.last_known_progress_update_run_time as f64 / known) as u64;
        }

        // Make a wild guess based on the timeout or one day
        (0.2 * data.u64_or("assignment.timeout", SEC_PER_DAY) as f64) as u64
    }

    /// Estimated progress in `[0, 1]`, extrapolated beyond the last report.
    ///
    /// Returns the caller-supplied `wu_progress` verbatim when the process
    /// is not running or no progress report has arrived yet. Extrapolation
    /// past the last confirmed report is limited to one percent.
    pub fn estimated_progress(
        &self,
        data: &dyn UnitData,
        stored_run_time: u64,
        wu_progress: f64,
    ) -> f64 {
        if self.process_start_time == 0 || self.last_known_progress_update == 0 {
            return wu_progress;
        }

        // Progress made since the last report from the compute engine
        let run_time = self.run_time(stored_run_time);
        let delta = run_time as f64 - self.last_known_progress_update_run_time as f64;
        let runtime_estimate = self.run_time_estimate(data) as f64;
        let mut delta_progress = if 0.0 < delta && 0.0 < runtime_estimate {
            delta / runtime_estimate
        } else {
            0.0
        };
        if 0.01 < delta_progress {
            delta_progress = 0.01; // No more than 1%
        }

        let progress = self.known_progress() + delta_progress;
        if progress < 1.0 {
            progress
        } else {
            1.0 // No more than 100%
        }
    }

    /// Estimated seconds until the unit completes.
    pub fn eta(&self, data: &dyn UnitData, stored_run_time: u64, wu_progress: f64) -> u64 {
        let remaining = 1.0 - self.estimated_progress(data, stored_run_time, wu_progress);
        (self.run_time_estimate(data) as f64 * remaining) as u64
    }

    /// Estimated credit for the unit, including the early-return bonus.
    ///
    /// `eta` is the projected remaining time from [`Self::eta`]. The bonus
    /// window is anchored on the assignment request time so a client/server
    /// clock offset cancels out.
    pub fn credit_estimate(&self, data: &dyn UnitData, eta: u64) -> u64 {
        let mut credit = data.u64_or("assignment.credit", 0);

        let requested = data.timestamp("request.time");
        let timeout = data.u64_or("assignment.timeout", 0);
        let deadline = data.u64_or("assignment.deadline", 0);
        let delta = self.clock.now() as i64 - requested as i64 + eta as i64;

        // No bonus after timeout
        if 0 < delta && delta < timeout as i64 {
            let bonus = (0.75 * deadline as f64 / delta as f64).sqrt();
            if 1.0 < bonus {
                credit = (credit as f64 * bonus) as u64;
            }
        }

        credit
    }

    /// Points-per-day throughput implied by a credit and run-time estimate.
    pub fn ppd(&self, credit_estimate: u64, run_time_estimate: u64) -> u64 {
        if run_time_estimate == 0 {
            return 0;
        }
        (credit_estimate as f64 / run_time_estimate as f64 * SEC_PER_DAY as f64) as u64
    }

    /// Last progress fraction explicitly reported by the compute engine.
    pub fn known_progress(&self) -> f64 {
        if self.last_known_total == 0 {
            return 0.0;
        }
        self.last_known_done as f64 / self.last_known_total as f64
    }

    /// Record a progress report from the compute engine.
    ///
    /// Malformed reports (`total == 0` or `total < done`) are dropped
    /// silently. A report equal to the stored pair changes nothing, so the
    /// report timestamps only move when progress actually moves.
    pub fn update_known_progress(&mut self, done: u64, total: u64) {
        if total == 0 || total < done {
            return;
        }

        if self.last_known_done != done || self.last_known_total != total {
            self.last_known_done = done;
            self.last_known_total = total;
            self.last_known_progress_update = self.clock.now();
            // Run time of the current process instance only; the report
            // describes progress made since this process started.
            self.last_known_progress_update_run_time = self.run_time(0);
        }
    }

    /// Current accumulated clock skew, in seconds.
    pub fn clock_skew(&self) -> i64 {
        self.clock_skew
    }

    /// Restore a previously observed clock skew.
    pub fn set_clock_skew(&mut self, skew: i64) {
        self.clock_skew = skew;
    }
}

impl Default for UnitMetrics {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
