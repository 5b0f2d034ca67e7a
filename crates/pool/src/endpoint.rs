use std::time::Instant;

/// Health record of a single upstream address.
///
/// Values handed out by [`crate::Pool`] are snapshots; reporting goes back
/// through the pool so that the good/bad partition stays consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    address: String,
    failure_streak: u32,
    total_failures: u64,
    total_successes: u64,
    last_used_at: Option<Instant>,
    banned_at: Option<Instant>,
    ban_until: Option<Instant>,
}

impl Endpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            failure_streak: 0,
            total_failures: 0,
            total_successes: 0,
            last_used_at: None,
            banned_at: None,
            ban_until: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Consecutive failures since the last success or restore.
    pub fn failure_streak(&self) -> u32 {
        self.failure_streak
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    pub fn last_used_at(&self) -> Option<Instant> {
        self.last_used_at
    }

    /// When the current ban started, if any.
    pub fn banned_at(&self) -> Option<Instant> {
        self.banned_at
    }

    pub fn ban_until(&self) -> Option<Instant> {
        self.ban_until
    }

    pub fn is_banned(&self) -> bool {
        self.ban_until.is_some()
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_used_at = Some(now);
    }

    /// Counts a failure and returns the new streak.
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.failure_streak = self.failure_streak.saturating_add(1);
        self.total_failures = self.total_failures.saturating_add(1);
        self.failure_streak
    }

    pub(crate) fn record_success(&mut self) {
        self.total_successes = self.total_successes.saturating_add(1);
        self.clear_health();
    }

    pub(crate) fn ban(&mut self, now: Instant, until: Instant) {
        self.banned_at = Some(now);
        self.ban_until = Some(until);
    }

    pub(crate) fn clear_health(&mut self) {
        self.failure_streak = 0;
        self.banned_at = None;
        self.ban_until = None;
    }
}
