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

use crate::config::Config;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use irs_database_postgres::DatabaseContext;
use irs_loaders::{
  CsvProcessor, DataLoader, LoaderConfig, LoaderContext, ProcessTracker, RiskCsvLoader,
  RiskLoaderInput, StockCsvLoader, StockLoaderInput,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct LoadCommand {
  #[command(subcommand)]
  command: LoadSubcommands,
}

#[derive(Subcommand, Debug)]
enum LoadSubcommands {
  /// Load industry risk rows from a CSV extract
  Risk(RiskArgs),

  /// Load market index closes from a CSV extract
  Stock(StockArgs),
}

#[derive(Args, Debug)]
pub struct CsvArgs {
  /// CSV file with a header row naming the table columns
  file: PathBuf,

  /// Field delimiter
  #[arg(long, default_value_t = ',')]
  delimiter: char,

  /// Parse and validate without writing (dry run)
  #[arg(short, long)]
  dry_run: bool,

  /// Hide the progress bar
  #[arg(long)]
  no_progress: bool,
}

#[derive(Args, Debug)]
pub struct RiskArgs {
  #[command(flatten)]
  csv: CsvArgs,

  /// Delete stored rows for every date in the file before inserting
  #[arg(long)]
  replace: bool,
}

#[derive(Args, Debug)]
pub struct StockArgs {
  #[command(flatten)]
  csv: CsvArgs,

  /// Skip rows dated on or before the latest stored date
  #[arg(long)]
  incremental: bool,
}

impl CsvArgs {
  fn processor(&self) -> Result<CsvProcessor> {
    if !self.delimiter.is_ascii() {
      bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
    }
    Ok(CsvProcessor::new().with_delimiter(self.delimiter as u8))
  }

  fn loader_config(&self) -> LoaderConfig {
    LoaderConfig { show_progress: !self.no_progress, ..LoaderConfig::default() }
  }
}

/// Dry runs proceed without a database when none is reachable
fn database(config: &Config, dry_run: bool) -> Result<Option<DatabaseContext>> {
  match config.connect() {
    Ok(context) => Ok(Some(context)),
    Err(e) if dry_run => {
      warn!("Dry run without database: {:#}", e);
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

async fn report_processes(tracker: &ProcessTracker) {
  for process in tracker.get_all().await {
    let elapsed = process.end_time.map(|end| (end - process.start_time).num_milliseconds());
    info!(
      "{} finished as {:?} in {}ms ({} rows)",
      process.process_name,
      process.state,
      elapsed.unwrap_or_default(),
      process.records_processed.unwrap_or_default()
    );
  }
}

async fn load_risk(args: RiskArgs, config: &Config) -> Result<()> {
  let tracker = ProcessTracker::new();
  let mut context =
    LoaderContext::new(args.csv.loader_config()).with_process_tracker(tracker.clone());
  if let Some(db) = database(config, args.csv.dry_run)? {
    context = context.with_risk_repository(Arc::new(db.risk_repository()));
  }

  let loader = RiskCsvLoader::new().with_processor(args.csv.processor()?);
  let input = RiskLoaderInput {
    file_path: args.csv.file,
    replace: args.replace,
    dry_run: args.csv.dry_run,
  };
  let output = loader.load(&context, input).await;
  report_processes(&tracker).await;
  let output = output?;

  println!("Rows read:    {}", output.rows_read);
  println!("Rows skipped: {}", output.skipped);
  if output.dry_run {
    println!("Dry run: {} rows valid, nothing written", output.rows_read - output.skipped);
  } else {
    println!("Ids assigned: {}", output.ids_assigned);
    println!("Rows loaded:  {}", output.loaded);
  }
  Ok(())
}

async fn load_stock(args: StockArgs, config: &Config) -> Result<()> {
  let tracker = ProcessTracker::new();
  let mut context =
    LoaderContext::new(args.csv.loader_config()).with_process_tracker(tracker.clone());
  if let Some(db) = database(config, args.csv.dry_run)? {
    context = context.with_stock_repository(Arc::new(db.stock_repository()));
  }

  let loader = StockCsvLoader::new().with_processor(args.csv.processor()?);
  let input = StockLoaderInput {
    file_path: args.csv.file,
    incremental: args.incremental,
    dry_run: args.csv.dry_run,
  };
  let output = loader.load(&context, input).await;
  report_processes(&tracker).await;
  let output = output?;

  println!("Rows read:       {}", output.rows_read);
  println!("Rows skipped:    {}", output.skipped);
  println!("Changes derived: {}", output.changes_filled);
  if output.dry_run {
    println!("Dry run: {} rows valid, nothing written", output.rows_read - output.skipped);
    if output.incremental_unchecked {
      println!("Warning: no database, rows already stored were not skipped");
    }
  } else {
    println!("Ids assigned:    {}", output.ids_assigned);
    println!("Rows loaded:     {}", output.loaded);
  }
  Ok(())
}

pub async fn execute(cmd: LoadCommand, config: &Config) -> Result<()> {
  match cmd.command {
    LoadSubcommands::Risk(args) => load_risk(args, config).await,
    LoadSubcommands::Stock(args) => load_stock(args, config).await,
  }
}
