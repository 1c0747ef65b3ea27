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

//! STOCK table models and the day-over-day change fill used by loaders

use chrono::NaiveDate;
use diesel::prelude::*;
use irs_core::DateRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::stock;
use crate::validation::{RowCheck, ValidationError};

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = stock)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Stock {
  pub id: Option<i64>,
  pub sdate: Option<NaiveDate>,
  pub market_index: Option<String>,
  pub close: Option<f64>,
  pub change: Option<f64>,
  pub volume: Option<i64>,
}

/// Every STOCK column is nullable, so the input and insert shapes coincide
#[derive(Insertable, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = stock)]
pub struct NewStock {
  pub id: Option<i64>,
  pub sdate: Option<NaiveDate>,
  pub market_index: Option<String>,
  pub close: Option<f64>,
  pub change: Option<f64>,
  pub volume: Option<i64>,
}

impl NewStock {
  pub fn validate(&self, row: usize) -> Result<(), ValidationError> {
    let mut check = RowCheck::default();
    check.label("market_index", self.market_index.as_deref());
    check.finish(row)
  }

  pub fn validate_batch(rows: &[NewStock]) -> Result<(), ValidationError> {
    rows.iter().enumerate().try_for_each(|(row, record)| record.validate(row))
  }

  pub fn insert_batch(
    conn: &mut PgConnection,
    rows: &[NewStock],
    batch_size: usize,
  ) -> QueryResult<usize> {
    let mut total_inserted = 0;
    for chunk in rows.chunks(batch_size.max(1)) {
      total_inserted += diesel::insert_into(stock::table).values(chunk).execute(conn)?;
    }
    Ok(total_inserted)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockFilter {
  pub market_index: Option<String>,
  pub range: Option<DateRange>,
}

/// Close of every market index on the most recent STOCK date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestCloses {
  pub date: NaiveDate,
  pub closes: BTreeMap<String, f64>,
}

impl Stock {
  /// Filtered read ordered by date, then id
  pub fn query(conn: &mut PgConnection, filter: &StockFilter) -> QueryResult<Vec<Stock>> {
    use crate::schema::stock::dsl::*;

    let mut query = stock.select(Stock::as_select()).into_boxed();

    if let Some(ref label) = filter.market_index {
      query = query.filter(market_index.eq(label));
    }
    if let Some(range) = filter.range {
      query = query.filter(sdate.between(range.start, range.end));
    }

    query.order((sdate.asc(), id.asc())).load(conn)
  }

  pub fn market_indexes(conn: &mut PgConnection) -> QueryResult<Vec<String>> {
    use crate::schema::stock::dsl::*;

    let labels: Vec<Option<String>> = stock
      .select(market_index)
      .filter(market_index.is_not_null())
      .distinct()
      .order(market_index.asc())
      .load(conn)?;
    Ok(labels.into_iter().flatten().collect())
  }

  pub fn latest_closes(conn: &mut PgConnection) -> QueryResult<Option<LatestCloses>> {
    use crate::schema::stock::dsl::*;
    use diesel::dsl::max;

    let latest: Option<NaiveDate> = stock.select(max(sdate)).get_result(conn)?;
    let Some(latest) = latest else {
      return Ok(None);
    };

    let rows: Vec<(Option<String>, Option<f64>)> = stock
      .select((market_index, close))
      .filter(sdate.eq(latest))
      .order(id.asc())
      .load(conn)?;

    let closes = rows
      .into_iter()
      .filter_map(|(label, value)| Some((label?, value?)))
      .collect();

    Ok(Some(LatestCloses { date: latest, closes }))
  }

  /// `MAX(id) + 1`, or 1 on an empty table
  pub fn next_id(conn: &mut PgConnection) -> QueryResult<i64> {
    use crate::schema::stock::dsl::*;
    use diesel::dsl::max;

    let current: Option<i64> = stock.select(max(id)).get_result(conn)?;
    Ok(current.map_or(1, |value| value + 1))
  }
}

/// Fill missing `change` values with the day-over-day close difference.
///
/// Rows are sorted by (market_index, sdate). The previous close comes from the
/// preceding row of the same index, or from `prior` for the first row of an
/// index. Differences are rounded to two decimals; an index with no previous
/// close gets 0.0. Rows that already carry a change keep it but still feed the
/// running close.
pub fn fill_changes(rows: &mut [NewStock], prior: Option<&LatestCloses>) {
  rows.sort_by(|a, b| (&a.market_index, a.sdate).cmp(&(&b.market_index, b.sdate)));

  let mut last_close: BTreeMap<String, f64> =
    prior.map(|latest| latest.closes.clone()).unwrap_or_default();

  for row in rows.iter_mut() {
    let (Some(label), Some(close)) = (row.market_index.as_ref(), row.close) else {
      continue;
    };
    if row.change.is_none() {
      let change = last_close.get(label).map_or(0.0, |previous| close - previous);
      row.change = Some((change * 100.0).round() / 100.0);
    }
    last_close.insert(label.clone(), close);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, m, d)
  }

  fn row(label: &str, date: Option<NaiveDate>, close: f64) -> NewStock {
    NewStock {
      sdate: date,
      market_index: Some(label.to_string()),
      close: Some(close),
      ..NewStock::default()
    }
  }

  #[test]
  fn test_label_length_validated() {
    let rows = vec![row("KOSPI", day(1, 2), 1.0), row(&"X".repeat(101), day(1, 2), 1.0)];
    let err = NewStock::validate_batch(&rows).unwrap_err();
    assert_eq!(err.row, 1);
    assert_eq!(err.fields(), vec!["market_index"]);
  }

  #[test]
  fn test_all_null_row_is_valid() {
    assert!(NewStock::default().validate(0).is_ok());
  }

  #[test]
  fn test_fill_changes_within_batch() {
    let mut rows = vec![
      row("KOSPI", day(1, 3), 2510.456),
      row("KOSDAQ", day(1, 2), 850.0),
      row("KOSPI", day(1, 2), 2500.0),
      row("KOSDAQ", day(1, 3), 845.5),
    ];
    fill_changes(&mut rows, None);

    let summary: Vec<(&str, Option<f64>)> =
      rows.iter().map(|r| (r.market_index.as_deref().unwrap(), r.change)).collect();
    assert_eq!(
      summary,
      vec![
        ("KOSDAQ", Some(0.0)),
        ("KOSDAQ", Some(-4.5)),
        ("KOSPI", Some(0.0)),
        ("KOSPI", Some(10.46)),
      ]
    );
  }

  #[test]
  fn test_fill_changes_uses_prior_closes() {
    let prior = LatestCloses {
      date: day(1, 1).unwrap(),
      closes: BTreeMap::from([("KOSPI".to_string(), 2490.0)]),
    };
    let mut rows = vec![row("KOSPI", day(1, 2), 2500.0), row("KOSDAQ", day(1, 2), 850.0)];
    fill_changes(&mut rows, Some(&prior));

    assert_eq!(rows[0].market_index.as_deref(), Some("KOSDAQ"));
    assert_eq!(rows[0].change, Some(0.0));
    assert_eq!(rows[1].change, Some(10.0));
  }

  #[test]
  fn test_fill_changes_keeps_supplied_change() {
    let mut rows = vec![
      NewStock { change: Some(-1.25), ..row("KOSPI", day(1, 2), 2500.0) },
      row("KOSPI", day(1, 3), 2501.0),
    ];
    fill_changes(&mut rows, None);
    assert_eq!(rows[0].change, Some(-1.25));
    assert_eq!(rows[1].change, Some(1.0));
  }

  #[test]
  fn test_fill_changes_skips_rows_without_close() {
    let mut rows = vec![NewStock { close: None, ..row("KOSPI", day(1, 2), 0.0) }];
    fill_changes(&mut rows, None);
    assert_eq!(rows[0].change, None);
  }
}
