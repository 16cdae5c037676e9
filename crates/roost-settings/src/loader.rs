//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ClientSettings::default()`]
//! 2. If a settings file is given and exists, deep-merge it over defaults
//! 3. Apply `TWITTER_*` environment overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{ClientSettings, MAX_SESSION_POLL_INTERVAL_MS, MIN_SESSION_POLL_INTERVAL_MS};

/// Load defaults with environment overrides applied.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Load settings from a JSON file with environment overrides applied.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ClientSettings> {
    let defaults = serde_json::to_value(ClientSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ClientSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(settings: &mut ClientSettings) {
    apply_overrides_with(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Empty strings count as unset. Booleans accept `true`/`1`/`yes`/`on` and
/// `false`/`0`/`no`/`off`; anything else is ignored with a warning.
pub fn apply_overrides_with<F>(settings: &mut ClientSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let boolean = |name: &str| -> Option<bool> {
        let val = string(name)?;
        let parsed = parse_bool(&val);
        if parsed.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        parsed
    };

    // ── Identity ────────────────────────────────────────────────────
    if let Some(v) = string("TWITTER_USERNAME") {
        settings.identity.username = v;
    }
    if let Some(v) = string("TWITTER_PASSWORD") {
        settings.identity.password = v;
    }
    if let Some(v) = string("TWITTER_EMAIL") {
        settings.identity.email = v;
    }
    if let Some(v) = string("TWITTER_2FA_SECRET") {
        settings.identity.two_factor_secret = Some(v);
    }

    // ── Feature flags ───────────────────────────────────────────────
    if let Some(v) = boolean("TWITTER_SEARCH_ENABLE") {
        settings.search_enabled = v;
    }
    if let Some(v) = boolean("TWITTER_SPACES_ENABLE") {
        settings.spaces_enabled = v;
    }
    if let Some(v) = boolean("TWITTER_DRY_RUN") {
        settings.dry_run = v;
    }
    if let Some(v) = boolean("TWITTER_STOP_SPACES_ON_SHUTDOWN") {
        settings.stop_spaces_on_shutdown = v;
    }

    // ── Session ─────────────────────────────────────────────────────
    if let Some(val) = string("TWITTER_SESSION_POLL_INTERVAL_MS") {
        let parsed =
            parse_u64_range(&val, MIN_SESSION_POLL_INTERVAL_MS, MAX_SESSION_POLL_INTERVAL_MS);
        match parsed {
            Some(v) => settings.session_poll_interval_ms = v,
            None => warn!(
                key = "TWITTER_SESSION_POLL_INTERVAL_MS",
                value = %val,
                "invalid u64 env var, ignoring"
            ),
        }
    }
    if let Some(v) = string("TWITTER_CACHE_NAMESPACE") {
        settings.cache_namespace = v;
    }
}

/// Parse a boolean env value.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}
