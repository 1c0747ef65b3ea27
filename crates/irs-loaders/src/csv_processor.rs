//! CSV file processor for RISK and STOCK extracts
//!
//! Header names match the table columns and are compared case-insensitively;
//! unknown columns are ignored. Empty cells (after trimming) are nulls, and
//! numeric cells may carry thousands separators (`"1,234.5"`). Rows where
//! every known column is empty are counted and dropped.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use irs_database_postgres::models::{NewStock, RiskRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::{LoaderError, LoaderResult};

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

/// Parsed rows plus the number of all-empty rows that were dropped
#[derive(Debug, Clone, PartialEq)]
pub struct CsvBatch<T> {
  pub rows: Vec<T>,
  pub blank_rows: usize,
}

pub struct CsvProcessor {
  delimiter: u8,
}

impl Default for CsvProcessor {
  fn default() -> Self {
    Self::new()
  }
}

impl CsvProcessor {
  pub fn new() -> Self {
    Self { delimiter: b',' }
  }

  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  /// Parse a RISK extract
  pub fn read_risk<P: AsRef<Path>>(&self, path: P) -> LoaderResult<CsvBatch<RiskRecord>> {
    let file = File::open(path)?;
    self.read_risk_from(file)
  }

  pub fn read_risk_from<R: Read>(&self, input: R) -> LoaderResult<CsvBatch<RiskRecord>> {
    self.read_rows(input, |raw: RawRiskRow, cells| {
      Ok(RiskRecord {
        id: cells.integer("id", raw.id)?,
        rdate: cells.date("rdate", raw.rdate)?,
        industry: raw.industry,
        mean_sent: cells.float("mean_sent", raw.mean_sent)?,
        risk: cells.float("risk", raw.risk)?,
        predict: cells.float("predict", raw.predict)?,
        total_news: cells.integer("total_news", raw.total_news)?,
        article_ratio: cells.decimal("article_ratio", raw.article_ratio)?,
        total_volume: cells.integer("total_volume", raw.total_volume)?,
        trade_volume_ratio: cells.decimal("trade_volume_ratio", raw.trade_volume_ratio)?,
      })
    })
  }

  /// Parse a STOCK extract
  pub fn read_stock<P: AsRef<Path>>(&self, path: P) -> LoaderResult<CsvBatch<NewStock>> {
    let file = File::open(path)?;
    self.read_stock_from(file)
  }

  pub fn read_stock_from<R: Read>(&self, input: R) -> LoaderResult<CsvBatch<NewStock>> {
    self.read_rows(input, |raw: RawStockRow, cells| {
      Ok(NewStock {
        id: cells.integer("id", raw.id)?,
        sdate: cells.date("sdate", raw.sdate)?,
        market_index: raw.market_index,
        close: cells.float("close", raw.close)?,
        change: cells.float("change", raw.change)?,
        volume: cells.integer("volume", raw.volume)?,
      })
    })
  }

  fn read_rows<R, Raw, T, F>(&self, input: R, convert: F) -> LoaderResult<CsvBatch<T>>
  where
    R: Read,
    Raw: DeserializeOwned + BlankRow,
    F: Fn(Raw, Cells) -> LoaderResult<T>,
  {
    let mut reader =
      ReaderBuilder::new().delimiter(self.delimiter).trim(Trim::All).from_reader(input);
    let headers = normalized_headers(&mut reader)?;
    debug!("CSV columns: {:?}", headers);

    let mut batch = CsvBatch { rows: Vec::new(), blank_rows: 0 };
    for result in reader.records() {
      let record = result?;
      let line = record.position().map_or(0, |pos| pos.line());
      let raw: Raw = record.deserialize(Some(&headers)).map_err(|e| {
        LoaderError::CsvError(format!("line {}: {}", line, e))
      })?;
      if raw.is_blank() {
        batch.blank_rows += 1;
        continue;
      }
      batch.rows.push(convert(raw, Cells { line })?);
    }
    Ok(batch)
  }
}

fn normalized_headers<R: Read>(reader: &mut Reader<R>) -> LoaderResult<StringRecord> {
  let headers: StringRecord = reader
    .headers()?
    .iter()
    .map(|name| name.trim_start_matches('\u{feff}').trim().to_lowercase())
    .collect();
  reader.set_headers(headers.clone());
  Ok(headers)
}

trait BlankRow {
  fn is_blank(&self) -> bool;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRiskRow {
  id: Option<String>,
  rdate: Option<String>,
  industry: Option<String>,
  mean_sent: Option<String>,
  risk: Option<String>,
  predict: Option<String>,
  total_news: Option<String>,
  article_ratio: Option<String>,
  total_volume: Option<String>,
  trade_volume_ratio: Option<String>,
}

impl BlankRow for RawRiskRow {
  fn is_blank(&self) -> bool {
    [
      &self.id,
      &self.rdate,
      &self.industry,
      &self.mean_sent,
      &self.risk,
      &self.predict,
      &self.total_news,
      &self.article_ratio,
      &self.total_volume,
      &self.trade_volume_ratio,
    ]
    .iter()
    .all(|cell| cell.is_none())
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStockRow {
  id: Option<String>,
  sdate: Option<String>,
  market_index: Option<String>,
  close: Option<String>,
  change: Option<String>,
  volume: Option<String>,
}

impl BlankRow for RawStockRow {
  fn is_blank(&self) -> bool {
    [&self.id, &self.sdate, &self.market_index, &self.close, &self.change, &self.volume]
      .iter()
      .all(|cell| cell.is_none())
  }
}

/// Typed readers for the cells of one CSV line
struct Cells {
  line: u64,
}

fn without_separators(raw: &str) -> String {
  raw.replace(',', "")
}

/// `1000.0` as written for integer columns that also hold NaN
fn whole_number(text: &str) -> &str {
  match text.split_once('.') {
    Some((whole, fraction)) if !whole.is_empty() && fraction.bytes().all(|b| b == b'0') => whole,
    _ => text,
  }
}

impl Cells {
  fn integer<T: FromStr>(&self, column: &str, raw: Option<String>) -> LoaderResult<Option<T>> {
    raw
      .map(|text| {
        let cleaned = without_separators(&text);
        whole_number(&cleaned)
          .parse::<T>()
          .map_err(|_| LoaderError::bad_cell(self.line, column, &text, "an integer"))
      })
      .transpose()
  }

  /// `NaN` cells, as written by dataframe exports, read as null
  fn float(&self, column: &str, raw: Option<String>) -> LoaderResult<Option<f64>> {
    let Some(text) = raw.filter(|text| !text.eq_ignore_ascii_case("nan")) else {
      return Ok(None);
    };
    match without_separators(&text).parse::<f64>() {
      Ok(value) if value.is_finite() => Ok(Some(value)),
      _ => Err(LoaderError::bad_cell(self.line, column, &text, "a number")),
    }
  }

  fn decimal(&self, column: &str, raw: Option<String>) -> LoaderResult<Option<BigDecimal>> {
    raw
      .map(|text| {
        BigDecimal::from_str(&without_separators(&text))
          .map_err(|_| LoaderError::bad_cell(self.line, column, &text, "a decimal"))
      })
      .transpose()
  }

  /// Dates may carry a midnight time part (`2024-01-02 00:00:00`), which is ignored
  fn date(&self, column: &str, raw: Option<String>) -> LoaderResult<Option<NaiveDate>> {
    let Some(text) = raw else {
      return Ok(None);
    };
    let day_part = text.split_whitespace().next().unwrap_or_default();
    DATE_FORMATS
      .iter()
      .find_map(|format| NaiveDate::parse_from_str(day_part, format).ok())
      .map(Some)
      .ok_or_else(|| LoaderError::bad_cell(self.line, column, &text, "a date"))
  }
}
