use anyhow::{Context, Result};
use irs_core::Config as StoreConfig;
use irs_database_postgres::DatabaseContext;
use std::env;

/// Settings given on the command line; everything else comes from the environment
#[derive(Debug, Clone, Default)]
pub struct Config {
  pub database_url: Option<String>,
}

impl Config {
  /// Store configuration, with `--database-url` taking precedence over `DATABASE_URL`
  pub fn store(&self) -> Result<StoreConfig> {
    StoreConfig::from_lookup(|key| match key {
      "DATABASE_URL" => self.database_url.clone().or_else(|| env::var(key).ok()),
      _ => env::var(key).ok(),
    })
    .context("Invalid store configuration")
  }

  pub fn connect(&self) -> Result<DatabaseContext> {
    let store = self.store()?;
    DatabaseContext::from_config(&store).context("Failed to connect to database")
  }
}
