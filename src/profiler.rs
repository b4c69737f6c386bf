//! Turn timing profiler
//!
//! Records how long each turn took against the environment's per-turn budget.
//! Over-budget turns are always reported; the end-of-game summary only when
//! profiling is enabled in Overkill.toml.

use log::{info, warn};
use parking_lot::Mutex;
use std::time::Duration;

/// Aggregate timing for a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnStats {
    pub turns: usize,
    pub over_budget: usize,
    pub total: Duration,
    pub max: Duration,
}

impl TurnStats {
    pub fn average(&self) -> Duration {
        if self.turns == 0 {
            Duration::ZERO
        } else {
            self.total / self.turns as u32
        }
    }
}

pub struct TurnProfiler {
    budget: Duration,
    enabled: bool,
    stats: Mutex<TurnStats>,
}

impl TurnProfiler {
    pub fn new(turn_budget_ms: u64, enabled: bool) -> Self {
        TurnProfiler {
            budget: Duration::from_millis(turn_budget_ms),
            enabled,
            stats: Mutex::new(TurnStats::default()),
        }
    }

    pub fn record(&self, turn: u32, elapsed: Duration) {
        let mut stats = self.stats.lock();
        stats.turns += 1;
        stats.total += elapsed;
        stats.max = stats.max.max(elapsed);

        if elapsed > self.budget {
            stats.over_budget += 1;
            warn!(
                "Turn {}: took {}ms, over the {}ms budget",
                turn,
                elapsed.as_millis(),
                self.budget.as_millis()
            );
        }
    }

    pub fn stats(&self) -> TurnStats {
        *self.stats.lock()
    }

    /// Logs the session summary when profiling is enabled
    pub fn report(&self) {
        if !self.enabled {
            return;
        }
        let stats = self.stats();
        info!(
            "Profile: {} turns, avg {}us, max {}us, {} over budget",
            stats.turns,
            stats.average().as_micros(),
            stats.max.as_micros(),
            stats.over_budget
        );
    }
}
