//! Environment variable parsing utilities

use std::fmt::Display;
use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// A missing variable yields `default`; a present but unparsable one is an
/// error naming the variable.
pub fn parse_env_with_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
