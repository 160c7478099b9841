use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::room::service::OccupancyConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_DATABASE_URL: &str = "sqlite://messages.db";
const MAX_SESSION_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub database_url: String,
    pub occupancy: OccupancyConfig,
}

impl AppConfig {
    /// Reads `PORT`, `BIND_ADDRESS`, `DATABASE_URL`, `STALL_SESSION_SECS`
    /// and `STALL_POLL_MILLIS`, falling back to defaults for unset keys
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = OccupancyConfig::default();

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let session_secs = parse_or(&lookup, "STALL_SESSION_SECS", defaults.session_window.as_secs())?;
        let poll_millis = parse_or(
            &lookup,
            "STALL_POLL_MILLIS",
            defaults.poll_interval.as_millis() as u64,
        )?;

        check_range("STALL_SESSION_SECS", session_secs, 1, MAX_SESSION_SECS)?;
        check_range("STALL_POLL_MILLIS", poll_millis, 1, session_secs * 1000)?;

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            occupancy: OccupancyConfig {
                session_window: Duration::from_secs(session_secs),
                poll_interval: Duration::from_millis(poll_millis),
            },
        })
    }

    /// Address the HTTP listener binds to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_address(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://messages.db");
        assert_eq!(config.occupancy.session_window, Duration::from_secs(60));
        assert_eq!(config.occupancy.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("BIND_ADDRESS", "127.0.0.1"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("STALL_SESSION_SECS", "90"),
            ("STALL_POLL_MILLIS", "250"),
        ])
        .unwrap();

        assert_eq!(config.listen_address(), "127.0.0.1:8080");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.occupancy.session_window, Duration::from_secs(90));
        assert_eq!(config.occupancy.poll_interval, Duration::from_millis(250));
    }

    #[rstest]
    #[case("PORT", "not-a-port")]
    #[case("PORT", "70000")]
    #[case("STALL_SESSION_SECS", "-5")]
    #[case("STALL_POLL_MILLIS", "1s")]
    fn test_invalid_numbers(#[case] key: &str, #[case] value: &str) {
        let result = config_from(&[(key, value)]);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[rstest]
    #[case("STALL_SESSION_SECS", "0")]
    #[case("STALL_SESSION_SECS", "86401")]
    #[case("STALL_POLL_MILLIS", "0")]
    #[case("STALL_POLL_MILLIS", "60001")]
    fn test_out_of_range(#[case] key: &str, #[case] value: &str) {
        let result = config_from(&[(key, value)]);
        assert!(matches!(result, Err(ConfigError::OutOfRange { .. })));
    }
}
