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

//! Base traits and types for data loaders

use crate::{LoaderError, LoaderResult, ProcessTracker};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use irs_database_postgres::repository::{RiskRepository, StockRepository};
use std::sync::Arc;

/// Configuration for data loaders
#[derive(Debug, Clone)]
pub struct LoaderConfig {
  /// Enable progress tracking
  pub show_progress: bool,

  /// Enable process state tracking
  pub track_process: bool,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self { show_progress: true, track_process: true }
  }
}

/// Shared context for all loaders
///
/// Repositories are optional so that dry runs can parse and validate a file
/// without a database.
pub struct LoaderContext {
  pub config: LoaderConfig,
  pub process_tracker: Option<ProcessTracker>,
  pub risk_repository: Option<Arc<dyn RiskRepository>>,
  pub stock_repository: Option<Arc<dyn StockRepository>>,
}

impl LoaderContext {
  pub fn new(config: LoaderConfig) -> Self {
    Self { config, process_tracker: None, risk_repository: None, stock_repository: None }
  }

  pub fn with_process_tracker(mut self, tracker: ProcessTracker) -> Self {
    self.process_tracker = Some(tracker);
    self
  }

  pub fn with_risk_repository(mut self, risk_repo: Arc<dyn RiskRepository>) -> Self {
    self.risk_repository = Some(risk_repo);
    self
  }

  pub fn with_stock_repository(mut self, stock_repo: Arc<dyn StockRepository>) -> Self {
    self.stock_repository = Some(stock_repo);
    self
  }

  pub(crate) fn risk(&self) -> LoaderResult<&Arc<dyn RiskRepository>> {
    self
      .risk_repository
      .as_ref()
      .ok_or_else(|| LoaderError::ConfigurationError("no RISK repository configured".into()))
  }

  pub(crate) fn stock(&self) -> LoaderResult<&Arc<dyn StockRepository>> {
    self
      .stock_repository
      .as_ref()
      .ok_or_else(|| LoaderError::ConfigurationError("no STOCK repository configured".into()))
  }

  pub(crate) fn tracker(&self) -> Option<&ProcessTracker> {
    self.process_tracker.as_ref().filter(|_| self.config.track_process)
  }
}

/// Fill empty id slots with consecutive ids starting at `first`; returns how many were set
pub fn assign_missing_ids<T>(
  rows: &mut [T],
  first: i64,
  mut slot: impl FnMut(&mut T) -> &mut Option<i64>,
) -> usize {
  let mut next = first;
  for row in rows.iter_mut() {
    let id = slot(row);
    if id.is_none() {
      *id = Some(next);
      next += 1;
    }
  }
  (next - first) as usize
}

pub(crate) fn progress_bar(
  config: &LoaderConfig,
  len: usize,
  message: &str,
) -> Option<ProgressBar> {
  if !config.show_progress {
    return None;
  }
  let pb = ProgressBar::new(len as u64);
  let template = "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}";
  if let Ok(style) = ProgressStyle::default_bar().template(template) {
    pb.set_style(style.progress_chars("##-"));
  }
  pb.set_message(message.to_string());
  Some(pb)
}

/// Base trait for all data loaders
#[async_trait]
pub trait DataLoader: Send + Sync {
  /// The type of data this loader processes
  type Input;

  /// The result type after loading
  type Output;

  /// Load data from the given input
  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output>;

  /// Validate input before loading
  async fn validate_input(&self, _input: &Self::Input) -> LoaderResult<()> {
    Ok(())
  }

  /// Get loader name for logging/tracking
  fn name(&self) -> &'static str;
}
