use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use rand::{RngCore, SeedableRng, rngs::StdRng, seq::SliceRandom};

pub mod ban;
mod endpoint;
mod error;
mod reconciler;
mod select;

pub use ban::{BanPolicy, DEFAULT_BAN_DURATION, FixedCooldown, IdleWindow};
pub use endpoint::Endpoint;
pub use error::PoolError;
pub use reconciler::{DEFAULT_RESTORE_INTERVAL, ReconcilerHandle};
pub use select::SelectMode;

pub const DEFAULT_MAX_FAILURES: u32 = 3;

/// Health-aware set of upstream endpoints.
///
/// Endpoints live in exactly one of two rotations: `good`, which selection
/// reads from, and `bad`, which holds banned endpoints until the reconciler
/// restores them. Every operation takes the one state lock for its whole
/// critical section, so callers never observe an endpoint mid-move.
///
/// `Pool` is a cheap handle; clones share the same state.
#[derive(Clone)]
pub struct Pool {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<PoolState>,
    mode: SelectMode,
    max_failures: u32,
    ban_policy: Box<dyn BanPolicy>,
}

struct PoolState {
    // never shrinks; `good` and `bad` index into it
    endpoints: Vec<Endpoint>,
    index: HashMap<String, usize>,
    good: Vec<usize>,
    bad: Vec<usize>,
    cursor: usize,
    rng: Box<dyn RngCore + Send>,
}

pub struct PoolBuilder {
    mode: SelectMode,
    max_failures: u32,
    ban_policy: Box<dyn BanPolicy>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self {
            mode: SelectMode::default(),
            max_failures: DEFAULT_MAX_FAILURES,
            ban_policy: Box::new(FixedCooldown::default()),
            rng: None,
        }
    }

    pub fn mode(mut self, mode: SelectMode) -> Self {
        self.mode = mode;
        self
    }

    /// Consecutive failures before an endpoint is banned. Clamped to at least 1.
    pub fn max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures.max(1);
        self
    }

    pub fn ban_policy<P>(mut self, policy: P) -> Self
    where
        P: BanPolicy + 'static,
    {
        self.ban_policy = Box::new(policy);
        self
    }

    /// Shorthand for a [`FixedCooldown`] of `duration`.
    pub fn ban_duration(self, duration: Duration) -> Self {
        self.ban_policy(FixedCooldown(duration))
    }

    pub fn rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn seed(self, seed: u64) -> Self {
        self.rng(StdRng::seed_from_u64(seed))
    }

    pub fn build(self) -> Pool {
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_entropy()));

        Pool {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    endpoints: Vec::new(),
                    index: HashMap::new(),
                    good: Vec::new(),
                    bad: Vec::new(),
                    cursor: 0,
                    rng,
                }),
                mode: self.mode,
                max_failures: self.max_failures,
                ban_policy: self.ban_policy,
            }),
        }
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new(mode: SelectMode, max_failures: u32) -> Self {
        PoolBuilder::new()
            .mode(mode)
            .max_failures(max_failures)
            .build()
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    pub fn mode(&self) -> SelectMode {
        self.shared.mode
    }

    pub fn max_failures(&self) -> u32 {
        self.shared.max_failures
    }

    // Every critical section leaves the state consistent, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one address to the rotation.
    ///
    /// The line is trimmed; blank lines, `#` comments and addresses already
    /// known to the pool are ignored. Returns whether a new endpoint was created.
    pub fn add(&self, address: &str) -> bool {
        let address = address.trim();
        if address.is_empty() || address.starts_with('#') {
            return false;
        }

        let mut guard = self.lock();
        let state = &mut *guard;
        if state.index.contains_key(address) {
            return false;
        }

        let id = state.endpoints.len();
        state.endpoints.push(Endpoint::new(address));
        state.index.insert(address.to_string(), id);
        state.good.push(id);
        debug!("Added endpoint {}", address);
        true
    }

    /// Hands out one endpoint from the good rotation.
    pub fn select(&self) -> Result<Endpoint, PoolError> {
        self.select_at(Instant::now())
    }

    /// Like [`Pool::select`], stamping `now` as the endpoint's last use.
    pub fn select_at(&self, now: Instant) -> Result<Endpoint, PoolError> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let len = state.good.len();
        if len == 0 {
            return Err(PoolError::EmptyPool);
        }

        let idx = self
            .shared
            .mode
            .pick(len, &mut state.cursor, &mut *state.rng, select::unix_seconds());
        let endpoint = &mut state.endpoints[state.good[idx]];
        endpoint.touch(now);
        debug!("Selected endpoint {}", endpoint.address());
        Ok(endpoint.clone())
    }

    /// Clears the failure streak and any ban deadline. Does not move the
    /// endpoint between rotations; a banned endpoint comes back on the next
    /// reconciler pass.
    pub fn report_success(&self, address: &str) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Some(&id) = state.index.get(address.trim()) {
            state.endpoints[id].record_success();
        }
    }

    /// Counts a failure, banning the endpoint once its streak reaches the
    /// threshold. Returns the ban expiry when this call banned it.
    pub fn report_failure(&self, address: &str) -> Option<Instant> {
        self.report_failure_at(address, Instant::now())
    }

    pub fn report_failure_at(&self, address: &str, now: Instant) -> Option<Instant> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let id = *state.index.get(address.trim())?;
        let streak = state.endpoints[id].record_failure();
        if streak < self.shared.max_failures {
            return None;
        }

        // already banned: keep the existing deadline
        let pos = state.good.iter().position(|&good| good == id)?;

        let until = self.shared.ban_policy.ban_until(&state.endpoints[id], now);
        state.endpoints[id].ban(now, until);
        state.good.remove(pos);
        state.bad.push(id);
        state.cursor = 0;

        warn!(
            "Endpoint {} banned after {} consecutive failures",
            state.endpoints[id].address(),
            streak
        );
        Some(until)
    }

    /// Moves every banned endpoint whose ban has expired back into rotation.
    /// Returns the restored addresses.
    pub fn reconcile(&self) -> Vec<String> {
        self.reconcile_at(Instant::now())
    }

    pub fn reconcile_at(&self, now: Instant) -> Vec<String> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let policy = &self.shared.ban_policy;
        let endpoints = &state.endpoints;
        let mut expired = Vec::new();
        state.bad.retain(|&id| {
            if policy.is_expired(&endpoints[id], now) {
                expired.push(id);
                false
            } else {
                true
            }
        });

        if expired.is_empty() {
            return Vec::new();
        }

        let mut restored = Vec::with_capacity(expired.len());
        for id in expired {
            let endpoint = &mut state.endpoints[id];
            endpoint.clear_health();
            info!("Endpoint {} restored", endpoint.address());
            restored.push(endpoint.address().to_string());
            state.good.push(id);
        }
        state.cursor = 0;
        restored
    }

    /// Randomly reorders the good rotation and restarts round-robin.
    pub fn shuffle(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.good.shuffle(&mut *state.rng);
        state.cursor = 0;
    }

    /// Number of endpoints in rotation.
    pub fn count(&self) -> usize {
        self.lock().good.len()
    }

    /// Number of endpoints ever added, banned or not.
    pub fn total(&self) -> usize {
        self.lock().endpoints.len()
    }

    /// Snapshot of the good rotation, in selection order.
    pub fn list(&self) -> Vec<Endpoint> {
        let state = self.lock();
        state
            .good
            .iter()
            .map(|&id| state.endpoints[id].clone())
            .collect()
    }

    /// Snapshot of the banned endpoints.
    pub fn banned(&self) -> Vec<Endpoint> {
        let state = self.lock();
        state
            .bad
            .iter()
            .map(|&id| state.endpoints[id].clone())
            .collect()
    }

    pub fn get(&self, address: &str) -> Option<Endpoint> {
        let state = self.lock();
        let id = *state.index.get(address.trim())?;
        Some(state.endpoints[id].clone())
    }
}
