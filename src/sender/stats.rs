//! Cycle configuration and send counters.

use std::fmt;
use std::ops::AddAssign;

/// Cycle count entered by the user that means "run until stopped".
pub const UNBOUNDED_SENTINEL: u32 = 999;
/// Largest finite cycle count.
pub const MAX_FINITE_CYCLES: u32 = UNBOUNDED_SENTINEL - 1;
/// Upper bound on concurrent workers.
pub const MAX_WORKERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleCount {
    Finite(u32),
    Unbounded,
}

impl CycleCount {
    /// Interpret a raw cycle number: `999` is unbounded, `1..=998` finite.
    /// `0` and anything above the sentinel are rejected.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            UNBOUNDED_SENTINEL => Some(CycleCount::Unbounded),
            1..=MAX_FINITE_CYCLES => Some(CycleCount::Finite(raw)),
            _ => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, CycleCount::Unbounded)
    }

    /// Whether another cycle follows `cycle` (1-based).
    pub fn has_more_after(&self, cycle: u64) -> bool {
        match self {
            CycleCount::Finite(total) => cycle < u64::from(*total),
            CycleCount::Unbounded => true,
        }
    }
}

impl fmt::Display for CycleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleCount::Finite(n) => write!(f, "{}", n),
            CycleCount::Unbounded => write!(f, "∞"),
        }
    }
}

/// Validate a worker count against `1..=MAX_WORKERS`.
pub fn valid_workers(workers: usize) -> bool {
    (1..=MAX_WORKERS).contains(&workers)
}

/// Successful and failed sends of one worker or one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub successful: usize,
    pub failed: usize,
}

impl CycleStats {
    pub fn attempts(&self) -> usize {
        self.successful + self.failed
    }
}

impl AddAssign for CycleStats {
    fn add_assign(&mut self, other: Self) {
        self.successful += other.successful;
        self.failed += other.failed;
    }
}

impl std::iter::Sum for CycleStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(CycleStats::default(), |mut acc, s| {
            acc += s;
            acc
        })
    }
}

/// Totals across the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub successful: usize,
    pub failed: usize,
    pub cycles_completed: u64,
    /// Sends made by a cycle that was cut short by a stop request.
    pub interrupted: CycleStats,
}

impl RunStats {
    pub fn record_cycle(&mut self, cycle: CycleStats) {
        self.successful += cycle.successful;
        self.failed += cycle.failed;
        self.cycles_completed += 1;
    }

    pub fn record_interrupted(&mut self, partial: CycleStats) {
        self.successful += partial.successful;
        self.failed += partial.failed;
        self.interrupted += partial;
    }

    pub fn attempts(&self) -> usize {
        self.successful + self.failed
    }
}
