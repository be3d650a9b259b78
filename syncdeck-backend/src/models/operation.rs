use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl OperationStatus {
    /// Completed and failed operations never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Completed | OperationStatus::Failed)
    }
}

/// One sync/pull/push attempt tracked end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOperation {
    pub id: String,
    pub database_id: Option<String>,
    /// Operation kind: "sync", "pull", "push" — free-form by contract.
    pub operation: String,
    pub status: OperationStatus,
    pub records_processed: i64,
    pub total_records: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSyncOperation {
    pub database_id: Option<String>,
    pub operation: String,
    pub status: Option<OperationStatus>,
    pub records_processed: Option<i64>,
    pub total_records: Option<i64>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Updatable fields for PATCH. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncOperationPatch {
    #[serde(default, with = "serde_with::rust::double_option")]
    pub database_id: Option<Option<String>>,
    pub operation: Option<String>,
    pub status: Option<OperationStatus>,
    pub records_processed: Option<i64>,
    pub total_records: Option<i64>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub end_time: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub error_message: Option<Option<String>>,
}
