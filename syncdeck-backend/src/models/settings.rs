use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Singleton sync configuration. Exactly one instance exists for the life of
/// the process; updates mutate it in place, last writer wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    pub id: String,
    pub auto_sync: bool,
    /// Minutes between automatic syncs.
    pub sync_interval: i64,
    /// Local cache budget in MB.
    pub cache_size: i64,
    pub access_token: Option<String>,
    pub is_authenticated: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            auto_sync: true,
            sync_interval: 5,
            cache_size: 45,
            access_token: None,
            is_authenticated: false,
        }
    }
}

/// Updatable fields for PATCH. Unknown keys are rejected; `accessToken`
/// distinguishes "omitted" from an explicit null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncSettingsPatch {
    pub auto_sync: Option<bool>,
    pub sync_interval: Option<i64>,
    pub cache_size: Option<i64>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub access_token: Option<Option<String>>,
    pub is_authenticated: Option<bool>,
}
