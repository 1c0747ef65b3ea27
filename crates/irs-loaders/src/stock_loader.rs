//! STOCK loader that reads market index closes from CSV files
//!
//! Missing `change` values are derived from the previous close of the same
//! index, looking back into the table when the file continues it. Ids are
//! assigned after rows are ordered by (market_index, sdate).

use async_trait::async_trait;
use irs_database_postgres::models::{fill_changes, LatestCloses, NewStock};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{
  csv_processor::CsvProcessor,
  loader::{assign_missing_ids, progress_bar},
  process_tracker::ProcessState,
  DataLoader, LoaderContext, LoaderError, LoaderResult,
};

#[derive(Debug, Clone)]
pub struct StockLoaderInput {
  pub file_path: PathBuf,
  /// Skip rows dated on or before the latest stored `sdate`
  pub incremental: bool,
  /// Parse, validate and derive changes only
  pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockLoaderOutput {
  pub rows_read: usize,
  pub loaded: usize,
  pub skipped: usize,
  pub ids_assigned: usize,
  pub changes_filled: usize,
  pub dry_run: bool,
  /// Incremental load requested but no stored closes could be read
  pub incremental_unchecked: bool,
}

#[derive(Default)]
pub struct StockCsvLoader {
  processor: CsvProcessor,
}

impl StockCsvLoader {
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
    input: &StockLoaderInput,
  ) -> LoaderResult<StockLoaderOutput> {
    let batch = self.processor.read_stock(&input.file_path)?;
    let mut rows = batch.rows;
    let mut output = StockLoaderOutput {
      rows_read: rows.len() + batch.blank_rows,
      skipped: batch.blank_rows,
      dry_run: input.dry_run,
      ..StockLoaderOutput::default()
    };
    info!("Found {} STOCK rows in CSV ({} blank)", rows.len(), batch.blank_rows);

    NewStock::validate_batch(&rows)?;

    // A dry run reads the table when it can but does not require it
    let repository = match context.stock() {
      Ok(repository) => Some(repository),
      Err(_) if input.dry_run => None,
      Err(e) => return Err(e),
    };

    let latest = match repository {
      Some(repository) => repository.latest_stock_closes().await?,
      None => None,
    };

    if input.incremental && repository.is_none() {
      warn!("No database reachable: incremental filter not applied to dry run");
      output.incremental_unchecked = true;
    }

    if input.incremental {
      if let Some(ref latest) = latest {
        let before = rows.len();
        rows.retain(|row| row.sdate.map_or(true, |date| date > latest.date));
        let dropped = before - rows.len();
        if dropped > 0 {
          info!("Skipping {} rows already covered up to {}", dropped, latest.date);
        }
        output.skipped += dropped;
      }
    }

    if rows.is_empty() {
      warn!("Nothing to load from {:?}", input.file_path);
      return Ok(output);
    }

    let missing_before = rows.iter().filter(|row| row.change.is_none()).count();
    let prior = continued_from(&rows, latest.as_ref());
    fill_changes(&mut rows, prior);
    output.changes_filled = missing_before - rows.iter().filter(|row| row.change.is_none()).count();
    debug!("Derived {} day-over-day changes", output.changes_filled);

    let Some(repository) = repository.filter(|_| !input.dry_run) else {
      info!("Dry run: {} STOCK rows are valid", rows.len());
      return Ok(output);
    };

    if rows.iter().any(|row| row.id.is_none()) {
      let first = repository.next_stock_id().await?;
      output.ids_assigned = assign_missing_ids(&mut rows, first, |row| &mut row.id);
      info!("Assigned {} STOCK ids starting at {}", output.ids_assigned, first);
    }

    let total = rows.len();
    let progress = progress_bar(&context.config, total, "Writing STOCK rows");
    output.loaded = repository.insert_stock(rows).await?;

    if let Some(pb) = progress {
      pb.set_position(total as u64);
      pb.finish_with_message("STOCK loading complete");
    }
    Ok(output)
  }
}

/// Stored closes seed the change calculation only when every dated row is newer
fn continued_from<'a>(
  rows: &[NewStock],
  latest: Option<&'a LatestCloses>,
) -> Option<&'a LatestCloses> {
  latest.filter(|latest| rows.iter().filter_map(|row| row.sdate).all(|date| date > latest.date))
}

#[async_trait]
impl DataLoader for StockCsvLoader {
  type Input = StockLoaderInput;
  type Output = StockLoaderOutput;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    self.validate_input(&input).await?;
    info!("Loading STOCK rows from {:?} (incremental: {})", input.file_path, input.incremental);

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
    "stock_csv_loader"
  }
}
