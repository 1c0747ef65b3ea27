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

use crate::commands::cell;
use crate::config::Config;
use anyhow::Result;
use clap::{Args, Subcommand};
use irs_core::{DateRange, StoreTable};
use irs_database_postgres::models::{
  CombinedQuery, CombinedRow, CombinedSeries, Risk, RiskFilter, Stock, StockFilter,
};
use irs_database_postgres::repository::{ReportRepository, RiskRepository, StockRepository};

#[derive(Args, Debug)]
pub struct QueryCommand {
  #[command(subcommand)]
  command: QuerySubcommands,
}

/// Inclusive date window; both ends or neither
#[derive(Args, Debug, Default)]
pub struct RangeArgs {
  /// First date (YYYY-MM-DD)
  #[arg(long, requires = "to")]
  from: Option<String>,

  /// Last date (YYYY-MM-DD)
  #[arg(long, requires = "from")]
  to: Option<String>,
}

impl RangeArgs {
  fn range(&self) -> Result<Option<DateRange>> {
    match (&self.from, &self.to) {
      (Some(from), Some(to)) => Ok(Some(DateRange::parse(from, to)?)),
      _ => Ok(None),
    }
  }
}

#[derive(Subcommand, Debug)]
enum QuerySubcommands {
  /// Industry risk rows in date order
  Risk {
    /// Exact industry label
    #[arg(short, long)]
    industry: Option<String>,

    #[command(flatten)]
    range: RangeArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
  },

  /// Market index rows in date order
  Stock {
    /// Exact market index label
    #[arg(short, long)]
    market_index: Option<String>,

    #[command(flatten)]
    range: RangeArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
  },

  /// Index closes joined with same-day risk of one industry
  Combined {
    /// Industry label (surrounding whitespace ignored)
    #[arg(short, long)]
    industry: String,

    /// Text contained in the market index label
    #[arg(short, long)]
    market_index: String,

    #[command(flatten)]
    range: RangeArgs,

    /// Print chart series as JSON instead of a table
    #[arg(long)]
    json: bool,
  },

  /// Earliest and latest stored date of a table
  DateRange {
    /// risk or stock
    table: StoreTable,
  },

  /// Distinct industries present in RISK
  Industries,

  /// Distinct market indexes present in STOCK
  MarketIndexes,
}

fn print_risk(rows: &[Risk]) {
  println!(
    "{:<10} {:<20} {:>10} {:>10} {:>10} {:>10} {:>12} {:>14} {:>12}",
    "date", "industry", "mean_sent", "risk", "predict", "news", "article", "volume", "trade"
  );
  for row in rows {
    println!(
      "{:<10} {:<20} {:>10} {:>10} {:>10} {:>10} {:>12} {:>14} {:>12}",
      cell(row.rdate),
      cell(row.industry.as_deref()),
      cell(row.mean_sent),
      cell(row.risk),
      cell(row.predict),
      row.total_news,
      row.article_ratio.to_string(),
      row.total_volume,
      row.trade_volume_ratio.to_string()
    );
  }
  println!("{} rows", rows.len());
}

fn print_stock(rows: &[Stock]) {
  println!(
    "{:<10} {:<20} {:>12} {:>10} {:>14}",
    "date", "market_index", "close", "change", "volume"
  );
  for row in rows {
    println!(
      "{:<10} {:<20} {:>12} {:>10} {:>14}",
      cell(row.sdate),
      cell(row.market_index.as_deref()),
      cell(row.close),
      cell(row.change),
      cell(row.volume)
    );
  }
  println!("{} rows", rows.len());
}

fn print_combined(rows: &[CombinedRow]) {
  println!(
    "{:<10} {:<20} {:>12} {:>10} {:>10} {:>10} {:>12} {:>12}",
    "date", "market_index", "close", "mean_sent", "risk", "predict", "article", "trade"
  );
  for row in rows {
    println!(
      "{:<10} {:<20} {:>12} {:>10} {:>10} {:>10} {:>12} {:>12}",
      row.trade_date.to_string(),
      cell(row.market_index.as_deref()),
      cell(row.close),
      cell(row.mean_sent),
      cell(row.risk),
      cell(row.predict),
      cell(row.article_ratio.as_ref()),
      cell(row.trade_volume_ratio.as_ref())
    );
  }
  println!("{} rows", rows.len());
}

fn print_list(items: &[String]) {
  for item in items {
    println!("{}", item);
  }
}

pub async fn execute(cmd: QueryCommand, config: &Config) -> Result<()> {
  let context = config.connect()?;

  match cmd.command {
    QuerySubcommands::Risk { industry, range, json } => {
      let filter = RiskFilter { industry, range: range.range()? };
      let rows = context.risk_repository().query_risk(filter).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
      } else {
        print_risk(&rows);
      }
    }
    QuerySubcommands::Stock { market_index, range, json } => {
      let filter = StockFilter { market_index, range: range.range()? };
      let rows = context.stock_repository().query_stock(filter).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
      } else {
        print_stock(&rows);
      }
    }
    QuerySubcommands::Combined { industry, market_index, range, json } => {
      let query = CombinedQuery { industry, market_index, range: range.range()? };
      let rows = context.report_repository().query_combined(query).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&CombinedSeries::from_rows(&rows))?);
      } else {
        print_combined(&rows);
      }
    }
    QuerySubcommands::DateRange { table } => {
      let bounds = context.report_repository().date_range(table).await?;
      match (bounds.min_date, bounds.max_date) {
        (Some(min), Some(max)) => println!("{}: {} .. {}", table, min, max),
        _ => println!("{}: empty", table),
      }
    }
    QuerySubcommands::Industries => {
      print_list(&context.risk_repository().list_industries().await?);
    }
    QuerySubcommands::MarketIndexes => {
      print_list(&context.stock_repository().list_market_indexes().await?);
    }
  }
  Ok(())
}
