//! # irs-loaders
//!
//! Batch loading of RISK and STOCK extracts into the industry risk store.
//!
//! This crate provides:
//! - A CSV processor with case-insensitive headers and typed cell parsing
//! - `RiskCsvLoader`, which inserts or replaces whole days of industry risk rows
//! - `StockCsvLoader`, which appends index closes and derives day-over-day changes

pub mod csv_processor;
pub mod error;
pub mod loader;
pub mod process_tracker;
pub mod risk_loader;
pub mod stock_loader;

// Re-export commonly used types
pub use csv_processor::{CsvBatch, CsvProcessor};
pub use error::{LoaderError, LoaderResult};
pub use loader::{assign_missing_ids, DataLoader, LoaderConfig, LoaderContext};
pub use process_tracker::{ProcessInfo, ProcessState, ProcessTracker};

// Re-export loaders
pub use risk_loader::{RiskCsvLoader, RiskLoaderInput, RiskLoaderOutput};
pub use stock_loader::{StockCsvLoader, StockLoaderInput, StockLoaderOutput};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    DataLoader, LoaderConfig, LoaderContext, LoaderError, LoaderResult, ProcessState,
    ProcessTracker, RiskCsvLoader, StockCsvLoader,
  };
}
