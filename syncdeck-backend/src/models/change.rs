use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Synced,
    Failed,
}

/// A recorded create/update/delete event, surfaced to the UI as history.
/// Append-only: the store exposes no update path for changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChange {
    pub id: String,
    pub database_id: Option<String>,
    pub record_name: String,
    pub action: ChangeAction,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: ChangeStatus,
    pub record_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataChange {
    pub database_id: Option<String>,
    pub record_name: String,
    pub action: ChangeAction,
    pub status: Option<ChangeStatus>,
    pub record_data: Option<serde_json::Value>,
}
