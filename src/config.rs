//! Environment-driven settings.
//!
//! Every knob has a compiled-in default; a variable that is unset or does not
//! parse leaves the default in place.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use tracing::warn;

pub(crate) const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 500;
pub(crate) const DEFAULT_PERSIST_INTERVAL_MS: u64 = 30_000;
pub(crate) const DEFAULT_PERSIST_CHANNEL_CAPACITY: usize = 16;

/// Tuning knobs for the snapshot writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistConfig {
    /// Quiet period after the last change before a snapshot is written.
    pub debounce_ms: u64,
    /// Backstop period; any unsaved snapshot is written at least this often.
    pub interval_ms: u64,
    /// Capacity of the flush/shutdown control queue.
    pub channel_capacity: usize,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            interval_ms: DEFAULT_PERSIST_INTERVAL_MS,
            channel_capacity: DEFAULT_PERSIST_CHANNEL_CAPACITY,
        }
    }
}

impl PersistConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            debounce_ms: env_parse("DIAGRAM_PERSIST_DEBOUNCE_MS", DEFAULT_PERSIST_DEBOUNCE_MS),
            interval_ms: env_parse("DIAGRAM_PERSIST_INTERVAL_MS", DEFAULT_PERSIST_INTERVAL_MS),
            channel_capacity: env_parse("DIAGRAM_PERSIST_CHANNEL_CAPACITY", DEFAULT_PERSIST_CHANNEL_CAPACITY)
                .max(1),
        }
    }
}

/// Read `key` from the environment, falling back to `default`.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment value");
            default
        }
    }
}
