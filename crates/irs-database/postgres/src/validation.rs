//! Row validation applied before anything is written
//!
//! The database enforces NOT NULL, CHECK and NUMERIC(12,5) itself, but PostgreSQL
//! rounds excess fractional digits silently, so scale and precision are checked
//! here and reported with the offending field name.

use bigdecimal::BigDecimal;
use irs_core::{MAX_LABEL_LEN, RATIO_PRECISION, RATIO_SCALE};
use std::fmt;
use thiserror::Error;

/// A single field-level problem with an input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
  /// A NOT NULL column was not populated
  Missing(&'static str),
  /// More fractional digits than the column scale
  ScaleExceeded { field: &'static str, scale: i64 },
  /// More integer digits than the column precision allows
  PrecisionExceeded { field: &'static str, integer_digits: i64 },
  /// A count or volume below zero
  Negative(&'static str),
  /// A label longer than its VARCHAR bound
  TooLong { field: &'static str, len: usize },
}

impl Violation {
  pub fn field(&self) -> &'static str {
    match self {
      Violation::Missing(field)
      | Violation::Negative(field)
      | Violation::ScaleExceeded { field, .. }
      | Violation::PrecisionExceeded { field, .. }
      | Violation::TooLong { field, .. } => field,
    }
  }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Violation::Missing(field) => write!(f, "{} is required", field),
      Violation::ScaleExceeded { field, scale } => {
        write!(f, "{} has {} decimal places (max {})", field, scale, RATIO_SCALE)
      }
      Violation::PrecisionExceeded { field, integer_digits } => write!(
        f,
        "{} has {} integer digits (max {})",
        field,
        integer_digits,
        RATIO_PRECISION as i64 - RATIO_SCALE
      ),
      Violation::Negative(field) => write!(f, "{} must not be negative", field),
      Violation::TooLong { field, len } => {
        write!(f, "{} is {} characters (max {})", field, len, MAX_LABEL_LEN)
      }
    }
  }
}

/// All violations found on one row of a batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {}", describe(.violations))]
pub struct ValidationError {
  /// Zero-based position of the row in the submitted batch
  pub row: usize,
  pub violations: Vec<Violation>,
}

impl ValidationError {
  /// Names of the violating fields, in column order
  pub fn fields(&self) -> Vec<&'static str> {
    self.violations.iter().map(Violation::field).collect()
  }
}

fn describe(violations: &[Violation]) -> String {
  violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}

/// Accumulates violations for one row
#[derive(Debug, Default)]
pub(crate) struct RowCheck {
  violations: Vec<Violation>,
}

impl RowCheck {
  pub(crate) fn required<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
      self.violations.push(Violation::Missing(field));
    }
    value
  }

  pub(crate) fn ratio(&mut self, field: &'static str, value: Option<&BigDecimal>) {
    if let Some(value) = value {
      if let Some(violation) = check_ratio(field, value) {
        self.violations.push(violation);
      }
    }
  }

  pub(crate) fn non_negative(&mut self, field: &'static str, value: Option<i64>) {
    if matches!(value, Some(v) if v < 0) {
      self.violations.push(Violation::Negative(field));
    }
  }

  pub(crate) fn label(&mut self, field: &'static str, value: Option<&str>) {
    if let Some(value) = value {
      let len = value.chars().count();
      if len > MAX_LABEL_LEN {
        self.violations.push(Violation::TooLong { field, len });
      }
    }
  }

  pub(crate) fn finish(self, row: usize) -> Result<(), ValidationError> {
    if self.violations.is_empty() {
      Ok(())
    } else {
      Err(ValidationError { row, violations: self.violations })
    }
  }
}

/// Check a value against NUMERIC(RATIO_PRECISION, RATIO_SCALE)
pub fn check_ratio(field: &'static str, value: &BigDecimal) -> Option<Violation> {
  let normalized = value.normalized();
  let (_, scale) = normalized.as_bigint_and_exponent();
  if scale > RATIO_SCALE {
    return Some(Violation::ScaleExceeded { field, scale });
  }

  let integer_digits = normalized.digits() as i64 - scale;
  if integer_digits > RATIO_PRECISION as i64 - RATIO_SCALE {
    return Some(Violation::PrecisionExceeded { field, integer_digits });
  }
  None
}
