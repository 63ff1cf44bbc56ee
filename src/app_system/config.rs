use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::stats::DEFAULT_WORKER_COUNT;

/// Runtime configuration of the order system.
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | INVENTORY_PATH | ./input/products.csv | Inventory file loaded at startup |
/// | STATS_WORKERS | 3 | Size of the stats worker pool |
/// | INTAKE_BUFFER | 1 | Capacity of the order intake channel |
/// | STATS_TIMEOUT_MS | 600 | Default deadline for statistics reads |
#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    pub inventory_path: String,
    pub stats_workers: usize,
    pub intake_buffer: usize,
    pub stats_timeout: Duration,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            inventory_path: "./input/products.csv".into(),
            stats_workers: DEFAULT_WORKER_COUNT,
            intake_buffer: 1,
            stats_timeout: Duration::from_millis(600),
        }
    }
}

impl SystemConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SystemConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            inventory_path: lookup("INVENTORY_PATH").unwrap_or(defaults.inventory_path),
            stats_workers: positive(&lookup, "STATS_WORKERS")?.unwrap_or(defaults.stats_workers),
            intake_buffer: positive(&lookup, "INTAKE_BUFFER")?.unwrap_or(defaults.intake_buffer),
            stats_timeout: parse::<u64>(&lookup, "STATS_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.stats_timeout),
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

// Channel capacities and pool sizes of zero would make tokio panic.
fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match parse::<usize>(lookup, key)? {
        Some(0) => Err(ConfigError::InvalidValue {
            key,
            value: "0".into(),
        }),
        other => Ok(other),
    }
}
