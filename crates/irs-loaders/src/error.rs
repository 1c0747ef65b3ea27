/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use irs_database_postgres::{RepositoryError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LoaderError {
  #[error("CSV parsing error: {0}")]
  CsvError(String),

  #[error("IO error: {0}")]
  IoError(String),

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Invalid data: {0}")]
  InvalidData(String),

  #[error("Validation failed: {0}")]
  ValidationFailed(String),

  #[error("Process tracking error: {0}")]
  ProcessTrackingError(String),

  #[error("Configuration error: {0}")]
  ConfigurationError(String),
}

impl LoaderError {
  /// A cell that could not be read as the column's type
  pub fn bad_cell(line: u64, column: &str, raw: &str, expected: &str) -> Self {
    LoaderError::InvalidData(format!(
      "line {}, column {}: cannot read {:?} as {}",
      line, column, raw, expected
    ))
  }
}

// Implement conversions manually
impl From<csv::Error> for LoaderError {
  fn from(err: csv::Error) -> Self {
    LoaderError::CsvError(err.to_string())
  }
}

impl From<std::io::Error> for LoaderError {
  fn from(err: std::io::Error) -> Self {
    LoaderError::IoError(err.to_string())
  }
}

impl From<irs_core::Error> for LoaderError {
  fn from(err: irs_core::Error) -> Self {
    LoaderError::ConfigurationError(err.to_string())
  }
}

impl From<ValidationError> for LoaderError {
  fn from(err: ValidationError) -> Self {
    LoaderError::ValidationFailed(err.to_string())
  }
}

impl From<RepositoryError> for LoaderError {
  fn from(err: RepositoryError) -> Self {
    match err {
      RepositoryError::Validation(validation) => validation.into(),
      other => LoaderError::DatabaseError(other.to_string()),
    }
  }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
