//! RISK loader that reads daily industry risk extracts from CSV files

use async_trait::async_trait;
use irs_database_postgres::models::RiskRecord;
use irs_database_postgres::{ValidationError, Violation};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{
  csv_processor::CsvProcessor,
  loader::{assign_missing_ids, progress_bar},
  process_tracker::ProcessState,
  DataLoader, LoaderContext, LoaderError, LoaderResult,
};

#[derive(Debug, Clone)]
pub struct RiskLoaderInput {
  pub file_path: PathBuf,
  /// Delete every stored row dated like a row of the file before inserting
  pub replace: bool,
  /// Parse and validate only
  pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskLoaderOutput {
  pub rows_read: usize,
  pub loaded: usize,
  pub skipped: usize,
  pub ids_assigned: usize,
  pub dry_run: bool,
}

#[derive(Default)]
pub struct RiskCsvLoader {
  processor: CsvProcessor,
}

impl RiskCsvLoader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_processor(mut self, processor: CsvProcessor) -> Self {
    self.processor = processor;
    self
  }

  async fn run(
    &self,
    context: &LoaderContext,
    input: &RiskLoaderInput,
  ) -> LoaderResult<RiskLoaderOutput> {
    let batch = self.processor.read_risk(&input.file_path)?;
    let mut rows = batch.rows;
    let mut output = RiskLoaderOutput {
      rows_read: rows.len() + batch.blank_rows,
      skipped: batch.blank_rows,
      dry_run: input.dry_run,
      ..RiskLoaderOutput::default()
    };

    info!("Found {} RISK rows in CSV ({} blank)", rows.len(), batch.blank_rows);
    if rows.is_empty() {
      warn!("Nothing to load from {:?}", input.file_path);
      return Ok(output);
    }

    if input.dry_run {
      check_rows(&rows, input.replace)?;
      info!("Dry run: {} RISK rows are valid", rows.len());
      return Ok(output);
    }

    let repository = context.risk()?;
    if rows.iter().any(|row| row.id.is_none()) {
      let first = repository.next_risk_id().await?;
      output.ids_assigned = assign_missing_ids(&mut rows, first, |row| &mut row.id);
      info!("Assigned {} RISK ids starting at {}", output.ids_assigned, first);
    }

    let total = rows.len();
    let progress = progress_bar(&context.config, total, "Writing RISK rows");
    output.loaded = if input.replace {
      repository.replace_risk(rows).await?
    } else {
      repository.insert_risk(rows).await?
    };

    if let Some(pb) = progress {
      pb.set_position(total as u64);
      pb.finish_with_message("RISK loading complete");
    }
    Ok(output)
  }
}

/// Validation a write would apply, without the database
fn check_rows(rows: &[RiskRecord], replace: bool) -> Result<(), ValidationError> {
  RiskRecord::validate_batch(rows.to_vec())?;
  if replace {
    if let Some(row) = rows.iter().position(|row| row.rdate.is_none()) {
      return Err(ValidationError { row, violations: vec![Violation::Missing("rdate")] });
    }
  }
  Ok(())
}

#[async_trait]
impl DataLoader for RiskCsvLoader {
  type Input = RiskLoaderInput;
  type Output = RiskLoaderOutput;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    self.validate_input(&input).await?;
    info!("Loading RISK rows from {:?} (replace: {})", input.file_path, input.replace);

    if let Some(tracker) = context.tracker() {
      tracker.start(self.name()).await?;
    }

    let result = self.run(context, &input).await;

    if let Some(tracker) = context.tracker() {
      match &result {
        Ok(output) => tracker.complete(ProcessState::Success, output.loaded).await?,
        Err(e) => tracker.fail(e).await?,
      }
    }
    result
  }

  async fn validate_input(&self, input: &Self::Input) -> LoaderResult<()> {
    if !input.file_path.is_file() {
      return Err(LoaderError::IoError(format!("file not found: {}", input.file_path.display())));
    }
    Ok(())
  }

  fn name(&self) -> &'static str {
    "risk_csv_loader"
  }
}
