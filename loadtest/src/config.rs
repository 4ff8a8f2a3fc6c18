//! Configuration management for the load harness.
//!
//! Loads run parameters from environment variables with sensible defaults.
//! Everything here is fixed for the duration of one run.

use crate::error::ConfigError;
use crate::types::{EventId, VenueId};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Run configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target services
    pub target: TargetConfig,
    /// Virtual user population and pacing
    pub load: LoadConfig,
    /// Path to the venue layout document
    pub venues_file: PathBuf,
    /// Prometheus exporter listen address, if any
    pub metrics_addr: Option<SocketAddr>,
}

/// Where requests go and what they buy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Purchase service base address
    pub purchase_host: String,
    /// Query service base address
    pub query_host: String,
    /// Event every purchase targets
    pub event_id: EventId,
    /// Venue whose inventory is swept
    pub venue_id: VenueId,
}

/// Virtual user population and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Number of virtual users
    pub users: usize,
    /// Users started per second (0 starts everyone at once)
    pub spawn_rate: u32,
    /// Fixed wait between iterations, in milliseconds
    pub wait_time_ms: u64,
    /// Probability that a successful purchase is verified
    pub verify_probability: f64,
    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
}

impl LoadConfig {
    /// Fixed inter-iteration wait
    #[must_use]
    pub const fn wait_time(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }

    /// Per-request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults if environment variables are not set or do not
    /// parse.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            target: TargetConfig {
                purchase_host: lookup("PURCHASE_SERVICE_HOST")
                    .unwrap_or_else(|| "http://localhost:8081".to_string()),
                query_host: lookup("QUERY_SERVICE_HOST")
                    .unwrap_or_else(|| "http://localhost:8082".to_string()),
                event_id: EventId::new(
                    lookup("TARGET_EVENT_ID").unwrap_or_else(|| "Event1".to_string()),
                ),
                venue_id: VenueId::new(
                    lookup("TARGET_VENUE_ID").unwrap_or_else(|| "Venue1".to_string()),
                ),
            },
            load: LoadConfig {
                users: parse_var(&lookup, "LOADTEST_USERS").unwrap_or(100),
                spawn_rate: parse_var(&lookup, "LOADTEST_SPAWN_RATE").unwrap_or(10),
                wait_time_ms: parse_var(&lookup, "LOADTEST_WAIT_TIME_MS").unwrap_or(1000),
                verify_probability: parse_var(&lookup, "LOADTEST_VERIFY_PROBABILITY").unwrap_or(0.5),
                request_timeout_secs: parse_var(&lookup, "LOADTEST_REQUEST_TIMEOUT_SECS").unwrap_or(30),
            },
            venues_file: lookup("VENUES_FILE_PATH").map_or_else(
                || PathBuf::from("PurchaseService/src/main/resources/venues.yml"),
                PathBuf::from,
            ),
            metrics_addr: parse_var(&lookup, "METRICS_ADDR"),
        }
    }

    /// Check the parameters before anything is started.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for zero users, a verification probability
    /// outside `[0, 1]`, or a base address that is not http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load.users == 0 {
            return Err(ConfigError::NoUsers);
        }

        let p = self.load.verify_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }

        for (name, value) in [
            ("PURCHASE_SERVICE_HOST", &self.target.purchase_host),
            ("QUERY_SERVICE_HOST", &self.target.query_host),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidHost {
                    name,
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Look up and parse one variable; `None` if unset or unparseable
fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
