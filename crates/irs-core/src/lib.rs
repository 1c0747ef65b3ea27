pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{DateRange, StoreTable};

/// Maximum length of the `industry` and `market_index` labels.
pub const MAX_LABEL_LEN: usize = 100;

/// Scale of the fixed-precision ratio columns on RISK.
pub const RATIO_SCALE: i64 = 5;

/// Total digits of the fixed-precision ratio columns on RISK.
pub const RATIO_PRECISION: u64 = 12;

/// Canonical date format used on the wire and in the CLI.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
