// ABOUTME: Helpers for reading typed values from environment variables
// ABOUTME: Missing or unparsable values fall back to a default with a warning

use std::str::FromStr;
use tracing::warn;

/// Read a required, non-empty environment variable.
pub fn require_env(key: &str) -> Result<String, String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("Environment variable {} not set", key)),
    }
}

/// Read an environment variable, falling back to `default` when unset or empty.
pub fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
