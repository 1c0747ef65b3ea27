//! Configuration management for the risk store

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;
pub const DEFAULT_POOL_MIN_IDLE: u32 = 1;
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Main configuration struct for the store and its loaders
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// PostgreSQL connection URL
  pub database_url: String,

  /// Maximum pooled connections
  pub pool_max_size: u32,

  /// Idle connections kept warm by the pool
  pub pool_min_idle: u32,

  /// Seconds to wait for a pooled connection before failing
  pub connection_timeout_secs: u64,

  /// Rows per INSERT statement inside a bulk load
  pub batch_size: usize,
}

impl Config {
  /// Load configuration from environment variables (and `.env` if present)
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Build configuration from an arbitrary key lookup
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let database_url = lookup("DATABASE_URL")
      .filter(|url| !url.trim().is_empty())
      .ok_or_else(|| Error::Config("DATABASE_URL not set".to_string()))?;

    let pool_max_size = parse_or(&lookup, "IRS_POOL_MAX_SIZE", DEFAULT_POOL_MAX_SIZE)?;
    let pool_min_idle = parse_or(&lookup, "IRS_POOL_MIN_IDLE", DEFAULT_POOL_MIN_IDLE)?;
    let connection_timeout_secs =
      parse_or(&lookup, "IRS_CONNECTION_TIMEOUT_SECS", DEFAULT_CONNECTION_TIMEOUT_SECS)?;
    let batch_size = parse_or(&lookup, "IRS_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;

    if pool_max_size == 0 {
      return Err(Error::Config("IRS_POOL_MAX_SIZE must be at least 1".to_string()));
    }
    if pool_min_idle > pool_max_size {
      return Err(Error::Config("IRS_POOL_MIN_IDLE exceeds IRS_POOL_MAX_SIZE".to_string()));
    }
    if batch_size == 0 {
      return Err(Error::Config("IRS_BATCH_SIZE must be at least 1".to_string()));
    }

    Ok(Config { database_url, pool_max_size, pool_min_idle, connection_timeout_secs, batch_size })
  }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
  F: Fn(&str) -> Option<String>,
  T: FromStr,
{
  match lookup(key) {
    Some(raw) => raw.trim().parse().map_err(|_| Error::Config(format!("Invalid {}", key))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
      pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn test_defaults_applied() {
    let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/irs")]))
      .unwrap();
    assert_eq!(config.database_url, "postgres://localhost/irs");
    assert_eq!(config.pool_max_size, DEFAULT_POOL_MAX_SIZE);
    assert_eq!(config.pool_min_idle, DEFAULT_POOL_MIN_IDLE);
    assert_eq!(config.connection_timeout_secs, 30);
    assert_eq!(config.batch_size, 1000);
  }

  #[test]
  fn test_missing_database_url() {
    let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("DATABASE_URL"));
  }

  #[test]
  fn test_invalid_number_names_key() {
    let err = Config::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/irs"),
      ("IRS_BATCH_SIZE", "lots"),
    ]))
    .unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: Invalid IRS_BATCH_SIZE");
  }

  #[test]
  fn test_min_idle_cannot_exceed_max() {
    let err = Config::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/irs"),
      ("IRS_POOL_MAX_SIZE", "2"),
      ("IRS_POOL_MIN_IDLE", "5"),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
  }

  #[test]
  #[serial]
  fn test_config_from_env() {
    env::set_var("DATABASE_URL", "postgres://env-host/irs");
    env::set_var("IRS_POOL_MAX_SIZE", "4");
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "postgres://env-host/irs");
    assert_eq!(config.pool_max_size, 4);
    env::remove_var("IRS_POOL_MAX_SIZE");
  }
}
