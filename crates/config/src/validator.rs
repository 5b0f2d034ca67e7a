use log::{error, info};
use slist_pool::SelectMode;

use crate::config::Config;

pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub const VALID_BAN_POLICIES: &[&str] = &["fixed", "idle"];

pub fn validate(config: &Config) -> bool {
    info!("Starting configuration validation...");

    // --- Validate log level ---
    if !VALID_LOG_LEVELS
        .iter()
        .any(|lvl| lvl.eq_ignore_ascii_case(config.log.level.trim()))
    {
        error!("Invalid log level: {}", config.log.level);
        return false;
    }

    // --- Validate selection mode ---
    if let Err(err) = SelectMode::from_config(&config.pool.mode) {
        error!("Invalid pool mode: {}", err);
        return false;
    }

    // --- Validate health settings ---
    if config.pool.max_failures == 0 {
        error!("Pool max_failures is invalid (0)");
        return false;
    }

    if !VALID_BAN_POLICIES
        .iter()
        .any(|policy| policy.eq_ignore_ascii_case(config.pool.ban.policy.trim()))
    {
        error!("Invalid ban policy: {}", config.pool.ban.policy);
        return false;
    }

    if config.pool.ban.duration_ms == 0 {
        error!("Ban duration is invalid (0)");
        return false;
    }

    if config.pool.restore_interval_ms == 0 {
        error!("Restore interval is invalid (0)");
        return false;
    }

    // --- Validate sources ---
    if config.sources.iter().any(|source| source.trim().is_empty()) {
        error!("Server list source is empty");
        return false;
    }

    if config.servers.is_empty() && config.sources.is_empty() {
        error!("No servers or sources configured");
        return false;
    }

    info!("Configuration validation passed successfully");

    true
}
