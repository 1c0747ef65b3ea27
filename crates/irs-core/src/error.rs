use thiserror::Error;

/// The main error type for irs-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Date/Time parsing error
  #[error("Date parsing error: {0}")]
  ParseDate(#[from] chrono::ParseError),

  /// Inverted or otherwise unusable date range
  #[error("Invalid date range: {0}")]
  InvalidRange(String),

  /// Unknown table name
  #[error("Unknown table: {0}")]
  UnknownTable(String),
}

/// Result type alias for irs-* crates
pub type Result<T> = std::result::Result<T, Error>;
