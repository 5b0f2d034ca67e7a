use std::time::Duration;

use serde::{Deserialize, Serialize};
use slist_pool::{IdleWindow, PoolBuilder, PoolError, SelectMode};

use crate::default::{
    get_default_ban, get_default_ban_duration_ms, get_default_ban_policy, get_default_log,
    get_default_log_level, get_default_max_failures, get_default_mode, get_default_pool,
    get_default_restore_interval_ms,
};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "get_default_pool")]
    pub pool: PoolConfig,

    // inline addresses, one per entry
    #[serde(default)]
    pub servers: Vec<String>,

    // file paths or http:// urls holding one address per line
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default = "get_default_log")]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool: get_default_pool(),
            servers: Vec::new(),
            sources: Vec::new(),
            log: get_default_log(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolConfig {
    #[serde(default = "get_default_mode")]
    pub mode: String, // random | round-robin | time-hashed

    #[serde(default = "get_default_max_failures")]
    pub max_failures: u32,

    #[serde(default = "get_default_ban")]
    pub ban: Ban,

    #[serde(default = "get_default_restore_interval_ms")]
    pub restore_interval_ms: u64,

    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        get_default_pool()
    }
}

impl PoolConfig {
    pub fn restore_interval(&self) -> Duration {
        Duration::from_millis(self.restore_interval_ms)
    }

    pub fn builder(&self) -> Result<PoolBuilder, PoolError> {
        let mode = SelectMode::from_config(&self.mode)?;
        let duration = Duration::from_millis(self.ban.duration_ms);

        let builder = PoolBuilder::new()
            .mode(mode)
            .max_failures(self.max_failures);

        let builder = match self.ban.policy.trim().to_lowercase().as_str() {
            "fixed" => builder.ban_duration(duration),
            "idle" => builder.ban_policy(IdleWindow(duration)),
            _ => return Err(PoolError::InvalidPolicy(self.ban.policy.clone())),
        };

        Ok(match self.seed {
            Some(seed) => builder.seed(seed),
            None => builder,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Ban {
    #[serde(default = "get_default_ban_policy")]
    pub policy: String, // fixed | idle

    #[serde(default = "get_default_ban_duration_ms")]
    pub duration_ms: u64,
}

impl Default for Ban {
    fn default() -> Self {
        get_default_ban()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Log {
    #[serde(default = "get_default_log_level")]
    pub level: String, // trace, debug, info, warn, error, off

    #[serde(default)]
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        get_default_log()
    }
}
