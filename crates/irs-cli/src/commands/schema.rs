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
use irs_core::StoreTable;
use irs_database_postgres::ddl::SchemaStatus;
use irs_database_postgres::repository::SchemaRepository;
use tracing::info;

#[derive(Args, Debug)]
pub struct SchemaCommand {
  #[command(subcommand)]
  command: SchemaSubcommands,
}

#[derive(Subcommand, Debug)]
enum SchemaSubcommands {
  /// Create RISK and STOCK where they do not exist yet
  Create {
    /// Fail if either table already exists
    #[arg(long)]
    strict: bool,
  },

  /// Drop RISK and STOCK with all their rows
  Drop {
    /// Confirm the drop
    #[arg(long)]
    yes: bool,
  },

  /// Drop and recreate both tables in one transaction
  Reset {
    /// Confirm the reset
    #[arg(long)]
    yes: bool,
  },
}

fn confirmed(yes: bool, action: &str) -> Result<()> {
  if !yes {
    info!("Refusing to {} without confirmation", action);
    bail!("{} deletes every RISK and STOCK row; pass --yes to proceed", action);
  }
  Ok(())
}

fn names(tables: &[StoreTable]) -> String {
  if tables.is_empty() {
    return "none".to_string();
  }
  tables.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

fn report(status: &SchemaStatus) {
  println!("{:<17}{}", "Created:", names(&status.created));
  println!("{:<17}{}", "Already present:", names(&status.existing));
}

pub async fn execute(cmd: SchemaCommand, config: &Config) -> Result<()> {
  match &cmd.command {
    SchemaSubcommands::Drop { yes } => confirmed(*yes, "drop")?,
    SchemaSubcommands::Reset { yes } => confirmed(*yes, "reset")?,
    SchemaSubcommands::Create { .. } => {}
  }

  let context = config.connect()?;
  let schema = context.schema_repository();

  match cmd.command {
    SchemaSubcommands::Create { strict: true } => {
      let status = schema.create_schema_strict().await?;
      report(&status);
    }
    SchemaSubcommands::Create { strict: false } => {
      let status = schema.create_schema().await?;
      report(&status);
    }
    SchemaSubcommands::Drop { .. } => {
      schema.drop_schema().await?;
      println!("Dropped RISK and STOCK");
    }
    SchemaSubcommands::Reset { .. } => {
      let status = schema.reset_schema().await?;
      report(&status);
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_destructive_commands_need_confirmation() {
    let err = confirmed(false, "drop").unwrap_err();
    assert!(err.to_string().contains("--yes"));
    assert!(confirmed(true, "drop").is_ok());
  }

  #[test]
  fn test_names() {
    assert_eq!(names(&[]), "none");
    assert_eq!(names(&StoreTable::ALL), "RISK, STOCK");
  }
}
