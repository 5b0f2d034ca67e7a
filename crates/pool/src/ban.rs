//! Ban policies decide how long a failing endpoint stays out of rotation.
//!
//! Two designs are supported behind one trait:
//!
//! * [`FixedCooldown`] (the default) stamps an explicit expiry when the
//!   endpoint is banned. The ban lasts exactly that long no matter what the
//!   caller does in the meantime.
//! * [`IdleWindow`] ignores the stamped expiry and restores an endpoint once
//!   it has not been handed out for longer than the window. Because a banned
//!   endpoint is never selected, its `last_used_at` is frozen at the moment of
//!   its last selection, so an endpoint that sat idle before failing can come
//!   back sooner than a fixed cooldown of the same length would allow.

use std::time::{Duration, Instant};

use crate::Endpoint;

pub const DEFAULT_BAN_DURATION: Duration = Duration::from_secs(60);

// cap for cooldowns too large to represent as an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn deadline(start: Instant, cooldown: Duration) -> Instant {
    start
        .checked_add(cooldown)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

pub trait BanPolicy: Send + Sync {
    /// Expiry stamped on the endpoint at the moment it is banned.
    fn ban_until(&self, endpoint: &Endpoint, now: Instant) -> Instant;

    /// Whether a banned endpoint may go back into rotation.
    fn is_expired(&self, endpoint: &Endpoint, now: Instant) -> bool {
        match endpoint.ban_until() {
            Some(until) => now >= until,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCooldown(pub Duration);

impl Default for FixedCooldown {
    fn default() -> Self {
        Self(DEFAULT_BAN_DURATION)
    }
}

impl BanPolicy for FixedCooldown {
    fn ban_until(&self, _endpoint: &Endpoint, now: Instant) -> Instant {
        deadline(now, self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleWindow(pub Duration);

impl BanPolicy for IdleWindow {
    fn ban_until(&self, endpoint: &Endpoint, now: Instant) -> Instant {
        deadline(endpoint.last_used_at().unwrap_or(now), self.0)
    }

    fn is_expired(&self, endpoint: &Endpoint, now: Instant) -> bool {
        // never selected: measure from the ban itself
        match endpoint.last_used_at().or(endpoint.banned_at()) {
            Some(since) => now.saturating_duration_since(since) > self.0,
            None => true,
        }
    }
}

impl<F> BanPolicy for F
where
    F: Fn(&Endpoint, Instant) -> Instant + Send + Sync,
{
    fn ban_until(&self, endpoint: &Endpoint, now: Instant) -> Instant {
        self(endpoint, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banned(now: Instant, until: Instant) -> Endpoint {
        let mut endpoint = Endpoint::new("10.0.0.1");
        endpoint.ban(now, until);
        endpoint
    }

    #[test]
    fn fixed_cooldown_expires_at_deadline() {
        let now = Instant::now();
        let policy = FixedCooldown(Duration::from_secs(60));
        let until = policy.ban_until(&Endpoint::new("a"), now);
        let endpoint = banned(now, until);

        assert!(!policy.is_expired(&endpoint, now + Duration::from_secs(59)));
        assert!(policy.is_expired(&endpoint, now + Duration::from_secs(60)));
    }

    #[test]
    fn idle_window_measures_from_last_use() {
        let now = Instant::now();
        let policy = IdleWindow(Duration::from_secs(10));
        let mut endpoint = Endpoint::new("a");
        endpoint.touch(now);
        endpoint.ban(now + Duration::from_secs(8), now + Duration::from_secs(10));

        assert!(!policy.is_expired(&endpoint, now + Duration::from_secs(10)));
        assert!(policy.is_expired(&endpoint, now + Duration::from_secs(11)));
    }

    #[test]
    fn idle_window_without_use_measures_from_ban() {
        let now = Instant::now();
        let policy = IdleWindow(Duration::from_secs(10));
        let endpoint = banned(now, now + Duration::from_secs(10));

        assert!(!policy.is_expired(&endpoint, now + Duration::from_secs(5)));
        assert!(policy.is_expired(&endpoint, now + Duration::from_secs(11)));
    }

    #[test]
    fn huge_cooldowns_do_not_overflow() {
        let now = Instant::now();
        let endpoint = Endpoint::new("a");

        let fixed = FixedCooldown(Duration::MAX);
        let until = fixed.ban_until(&endpoint, now);
        assert!(until > now + Duration::from_secs(3600));
        assert!(!fixed.is_expired(&banned(now, until), now + Duration::from_secs(3600)));

        let idle = IdleWindow(Duration::MAX);
        assert!(idle.ban_until(&endpoint, now) > now);
        assert!(!idle.is_expired(&banned(now, until), now + Duration::from_secs(3600)));
    }

    #[test]
    fn closure_policy() {
        let now = Instant::now();
        let policy = |_: &Endpoint, now: Instant| now + Duration::from_secs(5);
        let until = policy.ban_until(&Endpoint::new("a"), now);
        assert_eq!(until, now + Duration::from_secs(5));
    }
}
