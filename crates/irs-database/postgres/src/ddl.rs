//! Table definitions and the create / drop / reset lifecycle
//!
//! Creation is create-if-absent: each table is checked in `information_schema`
//! first, so running it against a populated database leaves the data alone.
//! All lifecycle operations run inside a single transaction; PostgreSQL DDL is
//! transactional, so a reset never exposes a moment where neither table exists.

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Bool, Text};
use irs_core::StoreTable;
use log::{debug, info};
use serde::Serialize;

use crate::repository::{RepositoryError, RepositoryResult};

pub const CREATE_RISK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS risk (
    id BIGINT,
    rdate DATE,
    industry VARCHAR(100),
    mean_sent DOUBLE PRECISION,
    risk DOUBLE PRECISION,
    predict DOUBLE PRECISION,
    total_news INTEGER NOT NULL CHECK (total_news >= 0),
    article_ratio NUMERIC(12, 5) NOT NULL,
    total_volume BIGINT NOT NULL CHECK (total_volume >= 0),
    trade_volume_ratio NUMERIC(12, 5) NOT NULL
);
"#;

pub const CREATE_RISK_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS risk_industry_rdate_idx ON risk (industry, rdate);
"#;

pub const CREATE_STOCK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stock (
    id BIGINT,
    sdate DATE,
    market_index VARCHAR(100),
    close DOUBLE PRECISION,
    change DOUBLE PRECISION,
    volume BIGINT
);
"#;

pub const CREATE_STOCK_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS stock_market_index_sdate_idx ON stock (market_index, sdate);
"#;

pub const DROP_RISK_TABLE: &str = "DROP TABLE IF EXISTS risk";
pub const DROP_STOCK_TABLE: &str = "DROP TABLE IF EXISTS stock";

/// Which tables a create call built and which it found already present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
  pub created: Vec<StoreTable>,
  pub existing: Vec<StoreTable>,
}

impl SchemaStatus {
  pub fn is_fresh(&self) -> bool {
    self.existing.is_empty()
  }
}

fn create_statements(table: StoreTable) -> [&'static str; 2] {
  match table {
    StoreTable::Risk => [CREATE_RISK_TABLE, CREATE_RISK_INDEX],
    StoreTable::Stock => [CREATE_STOCK_TABLE, CREATE_STOCK_INDEX],
  }
}

fn drop_statement(table: StoreTable) -> &'static str {
  match table {
    StoreTable::Risk => DROP_RISK_TABLE,
    StoreTable::Stock => DROP_STOCK_TABLE,
  }
}

/// Does `table` exist in the connection's current schema?
pub fn table_exists(conn: &mut PgConnection, table: StoreTable) -> QueryResult<bool> {
  #[derive(QueryableByName)]
  struct Presence {
    #[diesel(sql_type = Bool)]
    present: bool,
  }

  let row: Presence = sql_query(
    "SELECT EXISTS (
       SELECT 1 FROM information_schema.tables
       WHERE table_schema = current_schema() AND table_name = $1
     ) AS present",
  )
  .bind::<Text, _>(table.table_name())
  .get_result(conn)?;

  Ok(row.present)
}

fn create_missing(conn: &mut PgConnection) -> RepositoryResult<SchemaStatus> {
  let mut status = SchemaStatus::default();
  for table in StoreTable::ALL {
    if table_exists(conn, table)? {
      debug!("{} already exists, leaving it in place", table);
      status.existing.push(table);
      continue;
    }
    for statement in create_statements(table) {
      sql_query(statement).execute(conn)?;
    }
    status.created.push(table);
  }
  Ok(status)
}

fn drop_all(conn: &mut PgConnection) -> RepositoryResult<()> {
  for table in StoreTable::ALL {
    sql_query(drop_statement(table)).execute(conn)?;
  }
  Ok(())
}

/// Create RISK and STOCK where absent; existing tables and their rows are untouched
pub fn create_schema(conn: &mut PgConnection) -> RepositoryResult<SchemaStatus> {
  let status = conn.transaction(create_missing)?;
  info!("Schema ready: created {:?}, existing {:?}", status.created, status.existing);
  Ok(status)
}

/// Create both tables, failing with `SchemaConflict` if either already exists
pub fn create_schema_strict(conn: &mut PgConnection) -> RepositoryResult<SchemaStatus> {
  conn.transaction::<_, RepositoryError, _>(|conn| {
    for table in StoreTable::ALL {
      if table_exists(conn, table)? {
        return Err(RepositoryError::SchemaConflict(table.to_string()));
      }
    }
    create_missing(conn)
  })
}

/// Drop both tables and everything in them
pub fn drop_schema(conn: &mut PgConnection) -> RepositoryResult<()> {
  conn.transaction(drop_all)?;
  info!("Dropped RISK and STOCK");
  Ok(())
}

/// Drop and recreate both tables in one transaction
pub fn reset_schema(conn: &mut PgConnection) -> RepositoryResult<SchemaStatus> {
  let status = conn.transaction::<_, RepositoryError, _>(|conn| {
    drop_all(conn)?;
    create_missing(conn)
  })?;
  info!("Reset RISK and STOCK");
  Ok(status)
}
