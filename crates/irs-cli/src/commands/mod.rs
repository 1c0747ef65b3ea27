pub mod load;
pub mod query;
pub mod schema;

use std::fmt::Display;

/// Text cell for an optional value; `-` when absent
pub(crate) fn cell<T: Display>(value: Option<T>) -> String {
  value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
