//! Randomized waits between sends and between cycles.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

use crate::error::{Error, Result};

/// Uniform delay ranges. Every call is an independent draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayPolicy {
    between_groups_secs: RangeInclusive<u64>,
    between_cycles_minutes: RangeInclusive<u64>,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        let (gmin, gmax) = crate::config::BETWEEN_GROUPS_SECS;
        let (cmin, cmax) = crate::config::BETWEEN_CYCLES_MINUTES;
        Self {
            between_groups_secs: gmin..=gmax,
            between_cycles_minutes: cmin..=cmax,
        }
    }
}

impl DelayPolicy {
    pub fn new(
        between_groups_secs: RangeInclusive<u64>,
        between_cycles_minutes: RangeInclusive<u64>,
    ) -> Result<Self> {
        if between_groups_secs.is_empty() {
            return Err(Error::Config(format!(
                "between_groups_secs range is inverted: {:?}",
                between_groups_secs
            )));
        }
        if between_cycles_minutes.is_empty() {
            return Err(Error::Config(format!(
                "between_cycles_minutes range is inverted: {:?}",
                between_cycles_minutes
            )));
        }
        Ok(Self {
            between_groups_secs,
            between_cycles_minutes,
        })
    }

    /// No waiting at all (dry runs and tests).
    pub fn immediate() -> Self {
        Self {
            between_groups_secs: 0..=0,
            between_cycles_minutes: 0..=0,
        }
    }

    /// Pause after a send inside one worker's batch.
    pub fn between_groups(&self, rng: &mut impl Rng) -> Duration {
        Duration::from_secs(rng.gen_range(self.between_groups_secs.clone()))
    }

    /// Pause after a whole cycle, drawn in whole minutes.
    pub fn between_cycles(&self, rng: &mut impl Rng) -> Duration {
        let minutes = rng.gen_range(self.between_cycles_minutes.clone());
        Duration::from_secs(minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn default_ranges() {
        let policy = DelayPolicy::default();
        assert_eq!(policy.between_groups_secs, 1..=3);
        assert_eq!(policy.between_cycles_minutes, 5..=10);
    }

    #[test]
    fn between_groups_stays_in_range() {
        let policy = DelayPolicy::new(1..=15, 5..=10).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let delay = policy.between_groups(&mut rng).as_secs();
            assert!((1..=15).contains(&delay), "got {}", delay);
        }
    }

    #[test]
    fn between_cycles_is_whole_minutes_in_range() {
        let policy = DelayPolicy::new(1..=3, 40..=90).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let secs = policy.between_cycles(&mut rng).as_secs();
            assert_eq!(secs % 60, 0);
            assert!((40 * 60..=90 * 60).contains(&secs), "got {}", secs);
        }
    }

    #[test]
    fn draws_cover_both_bounds() {
        let policy = DelayPolicy::new(1..=3, 5..=10).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let seen: std::collections::HashSet<u64> = (0..200)
            .map(|_| policy.between_groups(&mut rng).as_secs())
            .collect();

        assert!(seen.contains(&1));
        assert!(seen.contains(&3));
    }

    #[test]
    fn immediate_policy_never_waits() {
        let policy = DelayPolicy::immediate();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(policy.between_groups(&mut rng), Duration::ZERO);
        assert_eq!(policy.between_cycles(&mut rng), Duration::ZERO);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        #[allow(clippy::reversed_empty_ranges)]
        let groups = 5..=1;
        assert!(matches!(
            DelayPolicy::new(groups, 5..=10),
            Err(Error::Config(_))
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let cycles = 10..=5;
        assert!(DelayPolicy::new(1..=3, cycles).is_err());
    }
}
