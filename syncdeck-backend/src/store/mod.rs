//! Entity store - keyed in-memory collections behind an explicit trait handle.
//!
//! Route handlers and the sync runner receive an `Arc<dyn SyncStore>` rather
//! than a concrete type, so a durable backend can be substituted without
//! touching call sites. Methods are synchronous: every mutation runs to
//! completion inside one call, which is what makes the completion/timeout
//! race resolvable with a single compare-and-swap (`finish_operation`).

mod memory;

pub use memory::MemStore;

use thiserror::Error;

use crate::models::{
    ChangeAction, ChangeStatus, DataChange, DatabaseStatus, ExternalDatabase,
    ExternalDatabasePatch, NewDataChange, NewExternalDatabase, NewSyncOperation, SyncDirection,
    SyncOperation, SyncOperationPatch, SyncSettings, SyncSettingsPatch,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a database with external id '{0}' is already registered")]
    DuplicateExternalId(String),
    /// Catch-all for fallible backends standing in behind the trait.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Requested terminal state for a running operation.
#[derive(Debug, Clone)]
pub enum OperationOutcome {
    /// Marks the operation completed with `recordsProcessed = totalRecords`.
    Completed,
    Failed { message: String },
}

/// How a `finish_operation` attempt landed.
#[derive(Debug, Clone, PartialEq)]
pub enum FinishResult {
    Applied(SyncOperation),
    /// The operation was not running anymore (or not yet); nothing changed.
    NotRunning(SyncOperation),
    NotFound,
}

pub trait SyncStore: Send + Sync {
    fn list_databases(&self) -> StoreResult<Vec<ExternalDatabase>>;
    fn get_database(&self, id: &str) -> StoreResult<Option<ExternalDatabase>>;
    fn create_database(&self, new: NewExternalDatabase) -> StoreResult<ExternalDatabase>;
    fn update_database(
        &self,
        id: &str,
        patch: ExternalDatabasePatch,
    ) -> StoreResult<Option<ExternalDatabase>>;
    fn delete_database(&self, id: &str) -> StoreResult<bool>;

    fn list_operations(&self) -> StoreResult<Vec<SyncOperation>>;
    fn get_operation(&self, id: &str) -> StoreResult<Option<SyncOperation>>;
    fn create_operation(&self, new: NewSyncOperation) -> StoreResult<SyncOperation>;
    fn update_operation(
        &self,
        id: &str,
        patch: SyncOperationPatch,
    ) -> StoreResult<Option<SyncOperation>>;
    /// Compare-and-swap terminal transition: applies the outcome only if the
    /// operation is still running, so competing timers cannot double-write.
    fn finish_operation(&self, id: &str, outcome: OperationOutcome) -> StoreResult<FinishResult>;

    /// Most recent first; records with no timestamp sort as oldest. `None`
    /// falls back to the store's default page of 50.
    fn list_changes(&self, limit: Option<usize>) -> StoreResult<Vec<DataChange>>;
    fn list_changes_by_database(&self, database_id: &str) -> StoreResult<Vec<DataChange>>;
    fn create_change(&self, new: NewDataChange) -> StoreResult<DataChange>;

    fn get_settings(&self) -> StoreResult<SyncSettings>;
    fn update_settings(&self, patch: SyncSettingsPatch) -> StoreResult<SyncSettings>;
}

/// Populate a fresh store with a couple of plausible databases and change
/// records so the dashboard has something to show. Opt-in via SEED_DEMO_DATA.
pub fn seed_demo_data(store: &dyn SyncStore) -> StoreResult<()> {
    let customers = store.create_database(NewExternalDatabase {
        external_id: "db_abc123def456".to_string(),
        name: "Customer Database".to_string(),
        record_count: Some(847),
        sync_direction: Some(SyncDirection::Bidirectional),
        status: Some(DatabaseStatus::Connected),
        is_active: Some(true),
    })?;
    let projects = store.create_database(NewExternalDatabase {
        external_id: "db_xyz789uvw012".to_string(),
        name: "Project Tracker".to_string(),
        record_count: Some(156),
        sync_direction: Some(SyncDirection::Pull),
        status: Some(DatabaseStatus::Syncing),
        is_active: Some(true),
    })?;

    store.update_database(
        &customers.id,
        ExternalDatabasePatch {
            last_sync: Some(Some(chrono::Utc::now())),
            ..Default::default()
        },
    )?;

    store.create_change(NewDataChange {
        database_id: Some(customers.id.clone()),
        record_name: "John Smith".to_string(),
        action: ChangeAction::Created,
        status: Some(ChangeStatus::Synced),
        record_data: Some(serde_json::json!({
            "email": "john@example.com",
            "type": "customer"
        })),
    })?;
    store.create_change(NewDataChange {
        database_id: Some(projects.id.clone()),
        record_name: "Website Redesign".to_string(),
        action: ChangeAction::Updated,
        status: Some(ChangeStatus::Pending),
        record_data: Some(serde_json::json!({
            "status": "in-progress",
            "priority": "high"
        })),
    })?;

    store.update_settings(SyncSettingsPatch {
        is_authenticated: Some(true),
        ..Default::default()
    })?;

    Ok(())
}
