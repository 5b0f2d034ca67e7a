use slist_pool::{DEFAULT_BAN_DURATION, DEFAULT_MAX_FAILURES, DEFAULT_RESTORE_INTERVAL};

use crate::config::{Ban, Log, PoolConfig};

// default values
pub fn get_default_mode() -> String {
    String::from("round-robin")
}

pub fn get_default_max_failures() -> u32 {
    DEFAULT_MAX_FAILURES
}

pub fn get_default_ban_policy() -> String {
    String::from("fixed")
}

pub fn get_default_ban_duration_ms() -> u64 {
    DEFAULT_BAN_DURATION.as_millis() as u64
}

pub fn get_default_restore_interval_ms() -> u64 {
    DEFAULT_RESTORE_INTERVAL.as_millis() as u64
}

pub fn get_default_log_level() -> String {
    String::from("info")
}

pub fn get_default_ban() -> Ban {
    Ban {
        policy: get_default_ban_policy(),
        duration_ms: get_default_ban_duration_ms(),
    }
}

pub fn get_default_pool() -> PoolConfig {
    PoolConfig {
        mode: get_default_mode(),
        max_failures: get_default_max_failures(),
        ban: get_default_ban(),
        restore_interval_ms: get_default_restore_interval_ms(),
        seed: None,
    }
}

pub fn get_default_log() -> Log {
    Log {
        level: get_default_log_level(),
        file: None,
    }
}
