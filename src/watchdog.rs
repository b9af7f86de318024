use std::time::Duration;

/// Tolerance used when comparing progress snapshots, wide enough to absorb
/// floating-point noise but far below any meaningful transfer progress.
const PROGRESS_EPSILON: f64 = 1e-6;

/// Sentinel below any real progress value so the first observation always
/// registers as a change.
const NO_SNAPSHOT: f64 = -1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallVerdict {
    /// The exchange is either progressing or has not yet exhausted its budget.
    Waiting,
    /// No observable progress for the whole attempt budget.
    Stalled,
}

/// Distinguishes "slow but progressing" from "stuck" during an in-flight
/// exchange.
///
/// On each poll tick the caller feeds in the combined progress value
/// (`upload_fraction + download_fraction`, so the range is `[0, 2]`) together
/// with the elapsed time since the attempt began. While the value keeps
/// changing the stall clock keeps resetting; a fixed wall-clock timeout would
/// kill slow-but-healthy transfers, whereas this only fires for exchanges
/// that made zero observable progress for the entire budget.
#[derive(Debug)]
pub struct StallWatchdog {
    budget: Duration,
    last_progress: f64,
    last_change_at: Duration,
}

impl StallWatchdog {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            last_progress: NO_SNAPSHOT,
            last_change_at: Duration::ZERO,
        }
    }

    /// Feed one poll tick. `now` is the elapsed time since the attempt began.
    pub fn observe(&mut self, progress: f64, now: Duration) -> StallVerdict {
        if approximately(self.last_progress, progress) {
            if now.saturating_sub(self.last_change_at) >= self.budget {
                return StallVerdict::Stalled;
            }
        } else {
            self.last_progress = progress;
            self.last_change_at = now;
        }
        StallVerdict::Waiting
    }
}

fn approximately(left: f64, right: f64) -> bool {
    (left - right).abs() <= PROGRESS_EPSILON
}
