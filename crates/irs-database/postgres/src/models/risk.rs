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

//! RISK table models: raw input records, validated inserts and query rows

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::prelude::*;
use irs_core::DateRange;
use serde::{Deserialize, Serialize};

use crate::schema::risk;
use crate::validation::{RowCheck, ValidationError};

/// A RISK row as read back from the database
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = risk)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Risk {
  pub id: Option<i64>,
  pub rdate: Option<NaiveDate>,
  pub industry: Option<String>,
  pub mean_sent: Option<f64>,
  #[diesel(column_name = risk_score)]
  pub risk: Option<f64>,
  pub predict: Option<f64>,
  pub total_news: i32,
  pub article_ratio: BigDecimal,
  pub total_volume: i64,
  pub trade_volume_ratio: BigDecimal,
}

/// A RISK row as handed over by a producer; nothing is guaranteed yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
  pub id: Option<i64>,
  pub rdate: Option<NaiveDate>,
  pub industry: Option<String>,
  pub mean_sent: Option<f64>,
  pub risk: Option<f64>,
  pub predict: Option<f64>,
  pub total_news: Option<i32>,
  pub article_ratio: Option<BigDecimal>,
  pub total_volume: Option<i64>,
  pub trade_volume_ratio: Option<BigDecimal>,
}

/// A RISK row that passed validation
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = risk)]
pub struct NewRisk {
  pub id: Option<i64>,
  pub rdate: Option<NaiveDate>,
  pub industry: Option<String>,
  pub mean_sent: Option<f64>,
  #[diesel(column_name = risk_score)]
  pub risk: Option<f64>,
  pub predict: Option<f64>,
  pub total_news: i32,
  pub article_ratio: BigDecimal,
  pub total_volume: i64,
  pub trade_volume_ratio: BigDecimal,
}

impl RiskRecord {
  /// Check required fields, ranges and precision; `row` is the batch position
  pub fn validate(self, row: usize) -> Result<NewRisk, ValidationError> {
    let mut check = RowCheck::default();

    check.label("industry", self.industry.as_deref());
    let total_news = check.required("total_news", self.total_news);
    check.non_negative("total_news", total_news.map(i64::from));
    check.ratio("article_ratio", self.article_ratio.as_ref());
    let article_ratio = check.required("article_ratio", self.article_ratio);
    let total_volume = check.required("total_volume", self.total_volume);
    check.non_negative("total_volume", total_volume);
    check.ratio("trade_volume_ratio", self.trade_volume_ratio.as_ref());
    let trade_volume_ratio = check.required("trade_volume_ratio", self.trade_volume_ratio);

    check.finish(row)?;

    // finish() has rejected the row if any required value is absent
    Ok(NewRisk {
      id: self.id,
      rdate: self.rdate,
      industry: self.industry,
      mean_sent: self.mean_sent,
      risk: self.risk,
      predict: self.predict,
      total_news: total_news.unwrap_or_default(),
      article_ratio: article_ratio.unwrap_or_default(),
      total_volume: total_volume.unwrap_or_default(),
      trade_volume_ratio: trade_volume_ratio.unwrap_or_default(),
    })
  }

  /// Validate a whole batch, stopping at the first bad row
  pub fn validate_batch(rows: Vec<RiskRecord>) -> Result<Vec<NewRisk>, ValidationError> {
    rows.into_iter().enumerate().map(|(row, record)| record.validate(row)).collect()
  }
}

/// Filter for RISK reads; `None` means unfiltered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskFilter {
  pub industry: Option<String>,
  pub range: Option<DateRange>,
}

impl NewRisk {
  /// Insert rows in chunks; callers own the surrounding transaction
  pub fn insert_batch(
    conn: &mut PgConnection,
    rows: &[NewRisk],
    batch_size: usize,
  ) -> QueryResult<usize> {
    let mut total_inserted = 0;
    for chunk in rows.chunks(batch_size.max(1)) {
      total_inserted += diesel::insert_into(risk::table).values(chunk).execute(conn)?;
    }
    Ok(total_inserted)
  }
}

impl Risk {
  /// Filtered read ordered by date, then id
  pub fn query(conn: &mut PgConnection, filter: &RiskFilter) -> QueryResult<Vec<Risk>> {
    use crate::schema::risk::dsl::*;

    let mut query = risk.select(Risk::as_select()).into_boxed();

    if let Some(ref label) = filter.industry {
      query = query.filter(industry.eq(label));
    }
    if let Some(range) = filter.range {
      query = query.filter(rdate.between(range.start, range.end));
    }

    query.order((rdate.asc(), id.asc())).load(conn)
  }

  /// Distinct industry labels, ascending
  pub fn industries(conn: &mut PgConnection) -> QueryResult<Vec<String>> {
    use crate::schema::risk::dsl::*;

    let labels: Vec<Option<String>> = risk
      .select(industry)
      .filter(industry.is_not_null())
      .distinct()
      .order(industry.asc())
      .load(conn)?;
    Ok(labels.into_iter().flatten().collect())
  }

  /// Remove every row dated on one of `dates`
  pub fn delete_for_dates(conn: &mut PgConnection, dates: &[NaiveDate]) -> QueryResult<usize> {
    use crate::schema::risk::dsl::*;

    diesel::delete(risk.filter(rdate.eq_any(dates.to_vec()))).execute(conn)
  }

  /// `MAX(id) + 1`, or 1 on an empty table
  pub fn next_id(conn: &mut PgConnection) -> QueryResult<i64> {
    use crate::schema::risk::dsl::*;
    use diesel::dsl::max;

    let current: Option<i64> = risk.select(max(id)).get_result(conn)?;
    Ok(current.map_or(1, |value| value + 1))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validation::Violation;
  use std::str::FromStr;

  fn complete_record() -> RiskRecord {
    RiskRecord {
      id: Some(1),
      rdate: NaiveDate::from_ymd_opt(2024, 1, 2),
      industry: Some("자동차".to_string()),
      mean_sent: Some(-0.21),
      risk: Some(3.4),
      predict: Some(1.0),
      total_news: Some(120),
      article_ratio: Some(BigDecimal::from_str("0.08123").unwrap()),
      total_volume: Some(5_400_000_000),
      trade_volume_ratio: Some(BigDecimal::from_str("0.11").unwrap()),
    }
  }

  #[test]
  fn test_complete_record_validates() {
    let row = complete_record().validate(0).unwrap();
    assert_eq!(row.total_news, 120);
    assert_eq!(row.total_volume, 5_400_000_000);
    assert_eq!(row.industry.as_deref(), Some("자동차"));
  }

  #[test]
  fn test_optional_fields_may_be_null() {
    let record = RiskRecord {
      id: None,
      rdate: None,
      industry: None,
      mean_sent: None,
      risk: None,
      predict: None,
      ..complete_record()
    };
    assert!(record.validate(0).is_ok());
  }

  #[test]
  fn test_missing_required_fields_are_named() {
    let record = RiskRecord { total_news: None, trade_volume_ratio: None, ..complete_record() };
    let err = record.validate(3).unwrap_err();
    assert_eq!(err.row, 3);
    assert_eq!(err.fields(), vec!["total_news", "trade_volume_ratio"]);
  }

  #[test]
  fn test_every_required_field_missing() {
    let err = RiskRecord::default().validate(0).unwrap_err();
    assert_eq!(
      err.fields(),
      vec!["total_news", "article_ratio", "total_volume", "trade_volume_ratio"]
    );
  }

  #[test]
  fn test_excess_scale_is_rejected() {
    let record = RiskRecord {
      article_ratio: Some(BigDecimal::from_str("0.123456").unwrap()),
      ..complete_record()
    };
    let err = record.validate(0).unwrap_err();
    assert_eq!(
      err.violations,
      vec![Violation::ScaleExceeded { field: "article_ratio", scale: 6 }]
    );
  }

  #[test]
  fn test_negative_counts_are_rejected() {
    let record = RiskRecord { total_news: Some(-1), ..complete_record() };
    let err = record.validate(0).unwrap_err();
    assert_eq!(err.violations, vec![Violation::Negative("total_news")]);
  }

  #[test]
  fn test_validate_batch_reports_first_bad_row() {
    let rows = vec![
      complete_record(),
      complete_record(),
      RiskRecord { total_volume: None, ..complete_record() },
    ];
    let err = RiskRecord::validate_batch(rows).unwrap_err();
    assert_eq!(err.row, 2);
    assert_eq!(err.fields(), vec!["total_volume"]);
  }
}
