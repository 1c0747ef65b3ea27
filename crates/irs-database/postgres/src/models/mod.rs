pub mod combined;
pub mod risk;
pub mod stock;

use chrono::NaiveDate;
use diesel::dsl::{max, min};
use diesel::prelude::*;
use irs_core::types::format_iso;
use irs_core::StoreTable;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use combined::{CombinedQuery, CombinedRow, CombinedSeries};
pub use risk::{NewRisk, Risk, RiskFilter, RiskRecord};
pub use stock::{fill_changes, LatestCloses, NewStock, Stock, StockFilter};

/// Earliest and latest date in a table, as `YYYY-MM-DD`; both `None` when empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
  pub min_date: Option<String>,
  pub max_date: Option<String>,
}

impl DateBounds {
  pub fn from_dates(min_date: Option<NaiveDate>, max_date: Option<NaiveDate>) -> Self {
    Self { min_date: min_date.map(format_iso), max_date: max_date.map(format_iso) }
  }

  pub fn is_empty(&self) -> bool {
    self.min_date.is_none() && self.max_date.is_none()
  }

  /// `SELECT min(date), max(date)` over the table's date column
  pub fn for_table(conn: &mut PgConnection, table: StoreTable) -> QueryResult<Self> {
    use crate::schema::{risk, stock};

    let (low, high): (Option<NaiveDate>, Option<NaiveDate>) = match table {
      StoreTable::Risk => {
        risk::table.select((min(risk::rdate), max(risk::rdate))).get_result(conn)?
      }
      StoreTable::Stock => {
        stock::table.select((min(stock::sdate), max(stock::sdate))).get_result(conn)?
      }
    };
    Ok(Self::from_dates(low, high))
  }
}
