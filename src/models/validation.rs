use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::connection::{Connection, ConnectionId};

pub type ValidationId = u64;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValidationStatus {
  #[default]
  Pending,
  Running,
  Completed,
  Failed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComparisonType {
  #[default]
  RowCount,
  DataMatch,
  Schema,
}

impl ComparisonType {
  pub fn label(&self) -> &'static str {
    match self {
      ComparisonType::RowCount => "Row Count",
      ComparisonType::DataMatch => "Data Match",
      ComparisonType::Schema => "Schema Comparison",
    }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
  pub source_query: String,
  pub target_query: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comparison_type: Option<ComparisonType>,
  pub key_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
  pub id: ValidationId,
  pub name: String,
  pub source_connection_id: ConnectionId,
  pub target_connection_id: ConnectionId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_connection: Option<Connection>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_connection: Option<Connection>,
  #[serde(default)]
  pub config: ValidationConfig,
  #[serde(default)]
  pub status: ValidationStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub results: Option<ValidationResults>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl Validation {
  pub fn source_name(&self) -> Option<&str> {
    self.source_connection.as_ref().map(|c| c.name.as_str())
  }

  pub fn target_name(&self) -> Option<&str> {
    self.target_connection.as_ref().map(|c| c.name.as_str())
  }

  /// Summary of the last run, all zeroes when the backend sent none.
  pub fn summary(&self) -> ResultSummary {
    self.results.as_ref().and_then(|r| r.summary.clone()).unwrap_or_default()
  }

  /// Success rate for list views. Zero and absent both read as "no rate".
  pub fn success_rate(&self) -> Option<f64> {
    self.results.as_ref().and_then(|r| r.summary.as_ref()).and_then(|s| s.success_rate).filter(|rate| *rate != 0.0)
  }
}

/// Backend-produced outcome of a run. Never edited client-side.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResults {
  pub execution_id: Option<String>,
  pub start_time: Option<DateTime<Utc>>,
  pub end_time: Option<DateTime<Utc>>,
  pub duration_ms: Option<u64>,
  pub summary: Option<ResultSummary>,
  pub details: Option<ValidationDetails>,
  pub errors: Vec<ResultError>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultSummary {
  pub source_row_count: Option<u64>,
  pub target_row_count: Option<u64>,
  pub matched_rows: Option<u64>,
  pub mismatched_rows: Option<u64>,
  pub missing_in_target: Option<u64>,
  pub extra_in_target: Option<u64>,
  pub success_rate: Option<f64>,
}

impl ResultSummary {
  pub fn has_discrepancies(&self) -> bool {
    [self.mismatched_rows, self.missing_in_target, self.extra_in_target].iter().any(|count| count.unwrap_or(0) > 0)
  }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationDetails {
  pub differences: Vec<Difference>,
  pub column_stats: BTreeMap<String, ColumnStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DifferenceKind {
  Missing,
  Extra,
  Mismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
  #[serde(default)]
  pub key: serde_json::Value,
  #[serde(rename = "type")]
  pub kind: DifferenceKind,
  #[serde(default)]
  pub source_data: Option<serde_json::Value>,
  #[serde(default)]
  pub target_data: Option<serde_json::Value>,
  #[serde(default)]
  pub columns: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnStats {
  pub source_min: Option<serde_json::Value>,
  pub source_max: Option<serde_json::Value>,
  pub source_avg: Option<f64>,
  pub target_min: Option<serde_json::Value>,
  pub target_max: Option<serde_json::Value>,
  pub target_avg: Option<f64>,
}

/// Run errors arrive either as bare strings or as structured entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultError {
  Message(String),
  Detailed {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Option<String>,
  },
}

impl ResultError {
  pub fn message(&self) -> &str {
    match self {
      ResultError::Message(message) => message,
      ResultError::Detailed { message, .. } if !message.is_empty() => message,
      ResultError::Detailed { .. } => "Unknown error",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatusInfo {
  pub id: ValidationId,
  pub status: ValidationStatus,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for create and update. Every submission resets the status to pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDraft {
  pub name: String,
  pub source_connection_id: ConnectionId,
  pub target_connection_id: ConnectionId,
  pub config: ValidationConfig,
  pub status: ValidationStatus,
}

impl ValidationDraft {
  pub fn new(
    name: impl Into<String>,
    source_connection_id: ConnectionId,
    target_connection_id: ConnectionId,
    config: ValidationConfig,
  ) -> Self {
    Self {
      name: name.into(),
      source_connection_id,
      target_connection_id,
      config,
      status: ValidationStatus::Pending,
    }
  }
}
