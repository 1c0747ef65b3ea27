//! Value types shared by the store, the loaders and the CLI

use crate::error::{Error, Result};
use crate::ISO_DATE_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The two fact tables held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreTable {
  /// Per-industry sentiment / risk observations
  Risk,
  /// Per-market-index price / volume observations
  Stock,
}

impl StoreTable {
  pub const ALL: [StoreTable; 2] = [StoreTable::Risk, StoreTable::Stock];

  /// Physical table name
  pub fn table_name(&self) -> &'static str {
    match self {
      StoreTable::Risk => "risk",
      StoreTable::Stock => "stock",
    }
  }
}

impl std::fmt::Display for StoreTable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StoreTable::Risk => write!(f, "RISK"),
      StoreTable::Stock => write!(f, "STOCK"),
    }
  }
}

impl FromStr for StoreTable {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "risk" => Ok(StoreTable::Risk),
      "stock" => Ok(StoreTable::Stock),
      other => Err(Error::UnknownTable(other.to_string())),
    }
  }
}

/// Inclusive calendar date range used to filter reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvalidRange(format!(
        "start {} is after end {}",
        format_iso(start),
        format_iso(end)
      )));
    }
    Ok(Self { start, end })
  }

  /// Parse a range from two `YYYY-MM-DD` strings
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    Self::new(parse_iso(start)?, parse_iso(end)?)
  }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_iso(raw: &str) -> Result<NaiveDate> {
  Ok(NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT)?)
}

/// Format a date as `YYYY-MM-DD`
pub fn format_iso(date: NaiveDate) -> String {
  date.format(ISO_DATE_FORMAT).to_string()
}
