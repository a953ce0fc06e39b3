//! Tunable constants for the route engine and the route provider.
//!
//! Both configurations have sensible defaults and can be overridden from the
//! environment:
//!
//! - `WAYFINDER_FLOOR_PENALTY`: distance charged for a floor mismatch (default `1000`)
//! - `WAYFINDER_WALKING_SPEED`: distance units walked per second (default `1`)
//! - `WAYFINDER_API_URL`: base URL of the live route service (unset means offline only)
//! - `WAYFINDER_REMOTE_TIMEOUT_MS`: budget for one remote attempt (default `10000`)
//! - `WAYFINDER_SNAPSHOT_MAX_AGE_SECS`: age after which cached snapshots are reported stale

use std::env;
use std::time::Duration;

use tracing::warn;

/// Distance charged whenever two nodes sit on different floors.
pub const FLOOR_PENALTY: f64 = 1000.0;

/// Assumed walking speed in plan-local distance units per second.
pub const WALKING_SPEED: f64 = 1.0;

/// Default budget for a single remote route attempt.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

const FLOOR_PENALTY_ENV: &str = "WAYFINDER_FLOOR_PENALTY";
const WALKING_SPEED_ENV: &str = "WAYFINDER_WALKING_SPEED";
const API_URL_ENV: &str = "WAYFINDER_API_URL";
const REMOTE_TIMEOUT_ENV: &str = "WAYFINDER_REMOTE_TIMEOUT_MS";
const SNAPSHOT_MAX_AGE_ENV: &str = "WAYFINDER_SNAPSHOT_MAX_AGE_SECS";

/// Constants used by the graph builder, the search heuristic, and the assembler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Distance charged for a step (or estimate) between two floors.
    pub floor_penalty: f64,
    /// Distance units per second used to derive estimated travel time.
    pub walking_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            floor_penalty: FLOOR_PENALTY,
            walking_speed: WALKING_SPEED,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            floor_penalty: positive_f64_env(FLOOR_PENALTY_ENV).unwrap_or(defaults.floor_penalty),
            walking_speed: positive_f64_env(WALKING_SPEED_ENV).unwrap_or(defaults.walking_speed),
        }
    }

    pub fn with_floor_penalty(mut self, floor_penalty: f64) -> Self {
        self.floor_penalty = floor_penalty;
        self
    }

    pub fn with_walking_speed(mut self, walking_speed: f64) -> Self {
        self.walking_speed = walking_speed;
        self
    }
}

/// Settings for the online/offline route provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the live route service; `None` disables the remote attempt.
    pub api_base_url: Option<String>,
    /// Upper bound on a single remote attempt before falling back.
    pub remote_timeout: Duration,
    /// Snapshots older than this are still used, but logged as stale.
    pub snapshot_max_age: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            snapshot_max_age: None,
        }
    }
}

impl ProviderConfig {
    /// Create configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let api_base_url = env::var(API_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let remote_timeout = positive_u64_env(REMOTE_TIMEOUT_ENV)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT);

        let snapshot_max_age = positive_u64_env(SNAPSHOT_MAX_AGE_ENV).map(Duration::from_secs);

        Self {
            api_base_url,
            remote_timeout,
            snapshot_max_age,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_snapshot_max_age(mut self, max_age: Duration) -> Self {
        self.snapshot_max_age = Some(max_age);
        self
    }
}

fn positive_f64_env(name: &str) -> Option<f64> {
    let raw = env::var(name).ok()?;
    match parse_positive_f64(&raw) {
        Some(value) => Some(value),
        None => {
            warn!(variable = name, value = %raw, "ignoring invalid configuration value");
            None
        }
    }
}

fn positive_u64_env(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "ignoring invalid configuration value");
            None
        }
    }
}

fn parse_positive_f64(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
