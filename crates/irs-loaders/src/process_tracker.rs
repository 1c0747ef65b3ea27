//! Process tracking for monitoring load jobs
//! This version uses in-memory tracking instead of database

use crate::{LoaderError, LoaderResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
  Running,
  Success,
  Failed,
}

#[derive(Debug, Clone)]
pub struct ProcessInfo {
  pub process_name: String,
  pub start_time: DateTime<Utc>,
  pub end_time: Option<DateTime<Utc>>,
  pub state: ProcessState,
  pub error_message: Option<String>,
  pub records_processed: Option<usize>,
}

/// In-memory process tracker
#[derive(Clone, Default)]
pub struct ProcessTracker {
  processes: Arc<Mutex<Vec<ProcessInfo>>>,
}

impl ProcessTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn start(&self, process_name: &str) -> LoaderResult<()> {
    let mut processes = self.processes.lock().await;
    processes.push(ProcessInfo {
      process_name: process_name.to_string(),
      start_time: Utc::now(),
      end_time: None,
      state: ProcessState::Running,
      error_message: None,
      records_processed: None,
    });
    Ok(())
  }

  /// Close the most recent process with its final state and row count
  pub async fn complete(&self, state: ProcessState, records: usize) -> LoaderResult<()> {
    let mut processes = self.processes.lock().await;
    let last = processes
      .last_mut()
      .ok_or_else(|| LoaderError::ProcessTrackingError("no process started".to_string()))?;
    last.state = state;
    last.end_time = Some(Utc::now());
    last.records_processed = Some(records);
    Ok(())
  }

  pub async fn fail(&self, error: &LoaderError) -> LoaderResult<()> {
    let mut processes = self.processes.lock().await;
    if let Some(last) = processes.last_mut() {
      last.state = ProcessState::Failed;
      last.end_time = Some(Utc::now());
      last.error_message = Some(error.to_string());
    }
    Ok(())
  }

  pub async fn get_all(&self) -> Vec<ProcessInfo> {
    self.processes.lock().await.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_start_and_complete() {
    let tracker = ProcessTracker::new();
    tracker.start("risk_csv_loader").await.unwrap();
    tracker.complete(ProcessState::Success, 12).await.unwrap();

    let all = tracker.get_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].process_name, "risk_csv_loader");
    assert_eq!(all[0].state, ProcessState::Success);
    assert_eq!(all[0].records_processed, Some(12));
    assert!(all[0].end_time.is_some());
  }

  #[tokio::test]
  async fn test_complete_without_start_is_an_error() {
    let tracker = ProcessTracker::new();
    let err = tracker.complete(ProcessState::Success, 0).await.unwrap_err();
    assert!(matches!(err, LoaderError::ProcessTrackingError(_)));
  }

  #[tokio::test]
  async fn test_fail_records_message() {
    let tracker = ProcessTracker::new();
    tracker.start("stock_csv_loader").await.unwrap();
    tracker.fail(&LoaderError::InvalidData("line 3".to_string())).await.unwrap();

    let all = tracker.get_all().await;
    assert_eq!(all[0].state, ProcessState::Failed);
    assert_eq!(all[0].error_message.as_deref(), Some("Invalid data: line 3"));
  }

  #[tokio::test]
  async fn test_clones_share_state() {
    let tracker = ProcessTracker::new();
    let handle = tracker.clone();
    handle.start("stock_csv_loader").await.unwrap();
    assert_eq!(tracker.get_all().await.len(), 1);
  }
}
