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

//! STOCK rows joined with the matching RISK row of the same day
//!
//! There is no foreign key between the tables; the join is on date and the
//! trimmed industry label, and the market index is matched as a substring.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Date, Float8, Int4, Int8, Nullable, Numeric, Text, Varchar};
use irs_core::types::format_iso;
use irs_core::DateRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedQuery {
  pub industry: String,
  pub market_index: String,
  pub range: Option<DateRange>,
}

#[derive(QueryableByName, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
  #[diesel(sql_type = Date)]
  pub trade_date: NaiveDate,
  #[diesel(sql_type = Nullable<Varchar>)]
  pub market_index: Option<String>,
  #[diesel(sql_type = Nullable<Float8>)]
  pub close: Option<f64>,
  #[diesel(sql_type = Nullable<Float8>)]
  pub change: Option<f64>,
  #[diesel(sql_type = Nullable<Int8>)]
  pub volume: Option<i64>,
  #[diesel(sql_type = Nullable<Float8>)]
  pub mean_sent: Option<f64>,
  #[diesel(sql_type = Nullable<Float8>)]
  pub risk: Option<f64>,
  #[diesel(sql_type = Nullable<Float8>)]
  pub predict: Option<f64>,
  #[diesel(sql_type = Nullable<Int4>)]
  pub total_news: Option<i32>,
  #[diesel(sql_type = Nullable<Numeric>)]
  pub article_ratio: Option<BigDecimal>,
  #[diesel(sql_type = Nullable<Int8>)]
  pub risk_volume: Option<i64>,
  #[diesel(sql_type = Nullable<Numeric>)]
  pub trade_volume_ratio: Option<BigDecimal>,
}

const COMBINED_SQL: &str = r#"
SELECT
    s.sdate AS trade_date,
    s.market_index,
    s.close,
    s.change,
    s.volume,
    r.mean_sent,
    r.risk,
    r.predict,
    r.total_news,
    r.article_ratio,
    r.total_volume AS risk_volume,
    r.trade_volume_ratio
FROM stock s
LEFT JOIN risk r
    ON r.rdate = s.sdate
    AND TRIM(r.industry) = TRIM($1)
WHERE s.sdate IS NOT NULL
    AND s.market_index LIKE '%' || TRIM($2) || '%'
    AND ($3::date IS NULL OR s.sdate >= $3)
    AND ($4::date IS NULL OR s.sdate <= $4)
ORDER BY s.sdate, s.id
"#;

impl CombinedRow {
  pub fn load(conn: &mut PgConnection, query: &CombinedQuery) -> QueryResult<Vec<CombinedRow>> {
    sql_query(COMBINED_SQL)
      .bind::<Text, _>(&query.industry)
      .bind::<Text, _>(&query.market_index)
      .bind::<Nullable<Date>, _>(query.range.map(|r| r.start))
      .bind::<Nullable<Date>, _>(query.range.map(|r| r.end))
      .load(conn)
  }
}

/// Parallel columns for charting; missing values become 0.0
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedSeries {
  pub dates: Vec<String>,
  pub closes: Vec<f64>,
  pub article_ratios: Vec<f64>,
  pub trade_volume_ratios: Vec<f64>,
  pub mean_sents: Vec<f64>,
  pub risk: Vec<f64>,
  pub predicts: Vec<f64>,
  /// The joined rows as read, nulls kept
  pub raw_data: Vec<CombinedRow>,
}

fn ratio_or_zero(value: Option<&BigDecimal>) -> f64 {
  value.and_then(|ratio| ratio.to_f64()).unwrap_or(0.0)
}

impl CombinedSeries {
  pub fn from_rows(rows: &[CombinedRow]) -> Self {
    let mut series = CombinedSeries::default();
    for row in rows {
      series.dates.push(format_iso(row.trade_date));
      series.closes.push(row.close.unwrap_or(0.0));
      series.article_ratios.push(ratio_or_zero(row.article_ratio.as_ref()));
      series.trade_volume_ratios.push(ratio_or_zero(row.trade_volume_ratio.as_ref()));
      series.mean_sents.push(row.mean_sent.unwrap_or(0.0));
      series.risk.push(row.risk.unwrap_or(0.0));
      series.predicts.push(row.predict.unwrap_or(0.0));
    }
    series.raw_data = rows.to_vec();
    series
  }

  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }
}
