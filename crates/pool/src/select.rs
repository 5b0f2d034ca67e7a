use std::{
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::{Rng, RngCore};

use crate::PoolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    Random,
    #[default]
    RoundRobin,
    /// Index by the current unix second, so independent processes loosely
    /// agree on an endpoint without talking to each other.
    TimeHashed,
}

impl SelectMode {
    pub fn from_config(value: &str) -> Result<Self, PoolError> {
        let mode = value.trim().to_lowercase();
        match mode.as_str() {
            "random" => Ok(Self::Random),
            "round-robin" | "round_robin" | "rr" => Ok(Self::RoundRobin),
            "time" | "time-hashed" | "time_hashed" => Ok(Self::TimeHashed),
            _ => Err(PoolError::InvalidPolicy(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectMode::Random => "random",
            SelectMode::RoundRobin => "round-robin",
            SelectMode::TimeHashed => "time-hashed",
        }
    }

    /// Picks an index into a rotation of `len` entries. `len` must be non-zero;
    /// `unix_secs` only matters to [`SelectMode::TimeHashed`].
    pub(crate) fn pick<R>(
        &self,
        len: usize,
        cursor: &mut usize,
        rng: &mut R,
        unix_secs: u64,
    ) -> usize
    where
        R: RngCore + ?Sized,
    {
        match self {
            SelectMode::Random => rng.gen_range(0..len),
            SelectMode::RoundRobin => {
                if *cursor >= len {
                    *cursor = 0;
                }
                let idx = *cursor;
                *cursor = (idx + 1) % len;
                idx
            }
            SelectMode::TimeHashed => (unix_secs % len as u64) as usize,
        }
    }
}

impl FromStr for SelectMode {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_config(s)
    }
}

impl std::fmt::Display for SelectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn select_mode_from_config() {
        assert_eq!(SelectMode::from_config("random"), Ok(SelectMode::Random));
        assert_eq!(SelectMode::from_config(" RR "), Ok(SelectMode::RoundRobin));
        assert_eq!(
            SelectMode::from_config("round_robin"),
            Ok(SelectMode::RoundRobin)
        );
        assert_eq!(
            "time-hashed".parse::<SelectMode>(),
            Ok(SelectMode::TimeHashed)
        );
        assert_eq!(
            SelectMode::from_config("weighted"),
            Err(PoolError::InvalidPolicy("weighted".to_string()))
        );
    }

    #[test]
    fn round_robin_wraps() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cursor = 0;
        let picks: Vec<usize> = (0..5)
            .map(|_| SelectMode::RoundRobin.pick(3, &mut cursor, &mut rng, 0))
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn round_robin_clamps_stale_cursor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cursor = 7;
        assert_eq!(SelectMode::RoundRobin.pick(2, &mut cursor, &mut rng, 0), 0);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn random_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut cursor = 0;
        for _ in 0..1000 {
            assert!(SelectMode::Random.pick(4, &mut cursor, &mut rng, 0) < 4);
        }
    }

    #[test]
    fn time_hashed_indexes_by_second() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cursor = 0;
        assert_eq!(SelectMode::TimeHashed.pick(3, &mut cursor, &mut rng, 7), 1);
        assert_eq!(SelectMode::TimeHashed.pick(3, &mut cursor, &mut rng, 9), 0);
        assert_eq!(SelectMode::TimeHashed.pick(3, &mut cursor, &mut rng, 11), 2);
        assert_eq!(SelectMode::TimeHashed.pick(1, &mut cursor, &mut rng, 11), 0);
    }

    #[test]
    fn time_hashed_is_stable_within_a_second() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut cursor = 0;
        let first = SelectMode::TimeHashed.pick(5, &mut cursor, &mut rng, 1_700_000_003);
        for _ in 0..10 {
            assert_eq!(
                SelectMode::TimeHashed.pick(5, &mut cursor, &mut rng, 1_700_000_003),
                first
            );
        }
        assert_eq!(cursor, 0);
    }
}
