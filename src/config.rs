//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::Amount;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Balance credited to every new account
    pub opening_balance: Amount,

    /// Session lifetime in hours
    pub session_ttl_hours: i64,

    /// Artificial delay added to every HTTP request
    pub simulated_latency_ms: u64,

    /// Seed the demo customer at startup
    pub seed_demo_data: bool,

    /// Interval of the expired-session sweep
    pub session_sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "PORT", "3000")?;
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let opening_balance = parse_var(&lookup, "OPENING_BALANCE", "10000")?;

        let session_ttl_hours: i64 = parse_var(&lookup, "SESSION_TTL_HOURS", "24")?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_TTL_HOURS"));
        }

        let simulated_latency_ms = parse_var(&lookup, "SIMULATED_LATENCY_MS", "0")?;
        let seed_demo_data = parse_var(&lookup, "SEED_DEMO_DATA", "true")?;

        let session_sweep_interval_secs: u64 =
            parse_var(&lookup, "SESSION_SWEEP_INTERVAL_SECS", "300")?;
        if session_sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("SESSION_SWEEP_INTERVAL_SECS"));
        }

        Ok(Self {
            host,
            port,
            environment,
            opening_balance,
            session_ttl_hours,
            simulated_latency_ms,
            seed_demo_data,
            session_sweep_interval_secs,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            opening_balance: Amount::from(crate::ledger::DEFAULT_OPENING_BALANCE),
            session_ttl_hours: crate::session::DEFAULT_SESSION_TTL_HOURS,
            simulated_latency_ms: 0,
            seed_demo_data: true,
            session_sweep_interval_secs: 300,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
