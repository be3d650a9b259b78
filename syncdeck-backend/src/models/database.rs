use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which way records flow between the workspace and the local mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    Bidirectional,
    Pull,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Syncing,
    Error,
}

/// A workspace database registered for syncing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDatabase {
    pub id: String,
    /// Identifier of the database on the workspace side. Unique.
    pub external_id: String,
    pub name: String,
    pub record_count: i64,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_direction: SyncDirection,
    pub status: DatabaseStatus,
    pub is_active: bool,
}

/// Registration payload. Omitted optional fields take the schema defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExternalDatabase {
    pub external_id: String,
    pub name: String,
    pub record_count: Option<i64>,
    pub sync_direction: Option<SyncDirection>,
    pub status: Option<DatabaseStatus>,
    pub is_active: Option<bool>,
}

/// Updatable fields for PATCH. Unknown keys are rejected at deserialization;
/// `lastSync` distinguishes "omitted" from an explicit null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExternalDatabasePatch {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub record_count: Option<i64>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub last_sync: Option<Option<DateTime<Utc>>>,
    pub sync_direction: Option<SyncDirection>,
    pub status: Option<DatabaseStatus>,
    pub is_active: Option<bool>,
}
