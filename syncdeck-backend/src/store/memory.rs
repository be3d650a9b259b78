//! In-memory store backend. Data lives for the life of the process and is
//! lost on restart; production deployments would swap in a durable backend
//! behind the same trait.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{FinishResult, OperationOutcome, StoreError, StoreResult, SyncStore};
use crate::models::{
    ChangeStatus, DataChange, DatabaseStatus, ExternalDatabase, ExternalDatabasePatch,
    NewDataChange, NewExternalDatabase, NewSyncOperation, OperationStatus, SyncDirection,
    SyncOperation, SyncOperationPatch, SyncSettings, SyncSettingsPatch,
};

/// Page size for `list_changes` when the caller passes no limit.
const DEFAULT_CHANGE_PAGE: usize = 50;

/// Insertion-ordered id -> row map.
struct Table<T> {
    rows: HashMap<String, T>,
    order: Vec<String>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, id: String, row: T) {
        self.order.push(id.clone());
        self.rows.insert(id, row);
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.rows.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.rows.remove(id).is_some() {
            self.order.retain(|k| k != id);
            true
        } else {
            false
        }
    }

    fn values(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|k| self.rows.get(k).cloned())
            .collect()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct MemStore {
    databases: RwLock<Table<ExternalDatabase>>,
    operations: RwLock<Table<SyncOperation>>,
    changes: RwLock<Table<DataChange>>,
    settings: RwLock<SyncSettings>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            databases: RwLock::new(Table::new()),
            operations: RwLock::new(Table::new()),
            changes: RwLock::new(Table::new()),
            settings: RwLock::new(SyncSettings::default()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncStore for MemStore {
    fn list_databases(&self) -> StoreResult<Vec<ExternalDatabase>> {
        Ok(self.databases.read().values())
    }

    fn get_database(&self, id: &str) -> StoreResult<Option<ExternalDatabase>> {
        Ok(self.databases.read().get(id).cloned())
    }

    fn create_database(&self, new: NewExternalDatabase) -> StoreResult<ExternalDatabase> {
        let mut table = self.databases.write();
        if table
            .values()
            .iter()
            .any(|db| db.external_id == new.external_id)
        {
            return Err(StoreError::DuplicateExternalId(new.external_id));
        }

        let database = ExternalDatabase {
            id: new_id(),
            external_id: new.external_id,
            name: new.name,
            record_count: new.record_count.unwrap_or(0),
            last_sync: None,
            sync_direction: new.sync_direction.unwrap_or(SyncDirection::Bidirectional),
            status: new.status.unwrap_or(DatabaseStatus::Connected),
            is_active: new.is_active.unwrap_or(true),
        };
        table.insert(database.id.clone(), database.clone());
        Ok(database)
    }

    fn update_database(
        &self,
        id: &str,
        patch: ExternalDatabasePatch,
    ) -> StoreResult<Option<ExternalDatabase>> {
        let mut table = self.databases.write();
        let Some(row) = table.get_mut(id) else {
            return Ok(None);
        };
        if let Some(v) = patch.external_id {
            row.external_id = v;
        }
        if let Some(v) = patch.name {
            row.name = v;
        }
        if let Some(v) = patch.record_count {
            row.record_count = v;
        }
        if let Some(v) = patch.last_sync {
            row.last_sync = v;
        }
        if let Some(v) = patch.sync_direction {
            row.sync_direction = v;
        }
        if let Some(v) = patch.status {
            row.status = v;
        }
        if let Some(v) = patch.is_active {
            row.is_active = v;
        }
        Ok(Some(row.clone()))
    }

    fn delete_database(&self, id: &str) -> StoreResult<bool> {
        Ok(self.databases.write().remove(id))
    }

    fn list_operations(&self) -> StoreResult<Vec<SyncOperation>> {
        Ok(self.operations.read().values())
    }

    fn get_operation(&self, id: &str) -> StoreResult<Option<SyncOperation>> {
        Ok(self.operations.read().get(id).cloned())
    }

    fn create_operation(&self, new: NewSyncOperation) -> StoreResult<SyncOperation> {
        let operation = SyncOperation {
            id: new_id(),
            database_id: new.database_id,
            operation: new.operation,
            status: new.status.unwrap_or(OperationStatus::Pending),
            records_processed: new.records_processed.unwrap_or(0),
            total_records: new.total_records.unwrap_or(0),
            start_time: Utc::now(),
            end_time: new.end_time,
            error_message: new.error_message,
        };
        self.operations
            .write()
            .insert(operation.id.clone(), operation.clone());
        Ok(operation)
    }

    fn update_operation(
        &self,
        id: &str,
        patch: SyncOperationPatch,
    ) -> StoreResult<Option<SyncOperation>> {
        let mut table = self.operations.write();
        let Some(row) = table.get_mut(id) else {
            return Ok(None);
        };
        if let Some(v) = patch.database_id {
            row.database_id = v;
        }
        if let Some(v) = patch.operation {
            row.operation = v;
        }
        if let Some(v) = patch.status {
            row.status = v;
        }
        if let Some(v) = patch.records_processed {
            row.records_processed = v;
        }
        if let Some(v) = patch.total_records {
            row.total_records = v;
        }
        if let Some(v) = patch.end_time {
            row.end_time = v;
        }
        if let Some(v) = patch.error_message {
            row.error_message = v;
        }
        Ok(Some(row.clone()))
    }

    fn finish_operation(&self, id: &str, outcome: OperationOutcome) -> StoreResult<FinishResult> {
        let mut table = self.operations.write();
        let Some(row) = table.get_mut(id) else {
            return Ok(FinishResult::NotFound);
        };
        if row.status != OperationStatus::Running {
            return Ok(FinishResult::NotRunning(row.clone()));
        }
        match outcome {
            OperationOutcome::Completed => {
                row.status = OperationStatus::Completed;
                row.records_processed = row.total_records;
            }
            OperationOutcome::Failed { message } => {
                row.status = OperationStatus::Failed;
                row.error_message = Some(message);
            }
        }
        row.end_time = Some(Utc::now());
        Ok(FinishResult::Applied(row.clone()))
    }

    fn list_changes(&self, limit: Option<usize>) -> StoreResult<Vec<DataChange>> {
        let mut changes = self.changes.read().values();
        changes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        changes.truncate(limit.unwrap_or(DEFAULT_CHANGE_PAGE));
        Ok(changes)
    }

    fn list_changes_by_database(&self, database_id: &str) -> StoreResult<Vec<DataChange>> {
        let mut changes: Vec<DataChange> = self
            .changes
            .read()
            .values()
            .into_iter()
            .filter(|c| c.database_id.as_deref() == Some(database_id))
            .collect();
        changes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(changes)
    }

    fn create_change(&self, new: NewDataChange) -> StoreResult<DataChange> {
        let change = DataChange {
            id: new_id(),
            database_id: new.database_id,
            record_name: new.record_name,
            action: new.action,
            timestamp: Some(Utc::now()),
            status: new.status.unwrap_or(ChangeStatus::Pending),
            record_data: new.record_data,
        };
        self.changes
            .write()
            .insert(change.id.clone(), change.clone());
        Ok(change)
    }

    fn get_settings(&self) -> StoreResult<SyncSettings> {
        Ok(self.settings.read().clone())
    }

    fn update_settings(&self, patch: SyncSettingsPatch) -> StoreResult<SyncSettings> {
        let mut settings = self.settings.write();
        if let Some(v) = patch.auto_sync {
            settings.auto_sync = v;
        }
        if let Some(v) = patch.sync_interval {
            settings.sync_interval = v;
        }
        if let Some(v) = patch.cache_size {
            settings.cache_size = v;
        }
        if let Some(v) = patch.access_token {
            settings.access_token = v;
        }
        if let Some(v) = patch.is_authenticated {
            settings.is_authenticated = v;
        }
        Ok(settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeAction;
    use std::thread::sleep;
    use std::time::Duration;

    fn new_db(external_id: &str) -> NewExternalDatabase {
        NewExternalDatabase {
            external_id: external_id.to_string(),
            name: format!("{} name", external_id),
            record_count: None,
            sync_direction: None,
            status: None,
            is_active: None,
        }
    }

    fn new_change(database_id: Option<&str>, name: &str) -> NewDataChange {
        NewDataChange {
            database_id: database_id.map(str::to_string),
            record_name: name.to_string(),
            action: ChangeAction::Created,
            status: None,
            record_data: None,
        }
    }

    #[test]
    fn database_create_applies_defaults() {
        let store = MemStore::new();
        let db = store.create_database(new_db("db_1")).unwrap();

        assert_eq!(db.record_count, 0);
        assert_eq!(db.sync_direction, SyncDirection::Bidirectional);
        assert_eq!(db.status, DatabaseStatus::Connected);
        assert!(db.is_active);
        assert!(db.last_sync.is_none());
        assert!(!db.id.is_empty());
    }

    #[test]
    fn duplicate_external_id_is_rejected() {
        let store = MemStore::new();
        store.create_database(new_db("db_1")).unwrap();

        let err = store.create_database(new_db("db_1")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateExternalId(_)));
        assert_eq!(store.list_databases().unwrap().len(), 1);
    }

    #[test]
    fn database_update_merges_only_provided_fields() {
        let store = MemStore::new();
        let db = store.create_database(new_db("db_1")).unwrap();

        let now = Utc::now();
        let updated = store
            .update_database(
                &db.id,
                ExternalDatabasePatch {
                    record_count: Some(42),
                    last_sync: Some(Some(now)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.record_count, 42);
        assert_eq!(updated.last_sync, Some(now));
        assert_eq!(updated.name, db.name);

        // Explicit null clears the nullable field; omission leaves it alone.
        let cleared = store
            .update_database(
                &db.id,
                ExternalDatabasePatch {
                    last_sync: Some(None),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!(cleared.last_sync.is_none());
        assert_eq!(cleared.record_count, 42);
    }

    #[test]
    fn update_missing_database_returns_none() {
        let store = MemStore::new();
        let result = store
            .update_database("missing", ExternalDatabasePatch::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn delete_reports_whether_the_row_existed() {
        let store = MemStore::new();
        let db = store.create_database(new_db("db_1")).unwrap();

        assert!(!store.delete_database("missing").unwrap());
        assert_eq!(store.list_databases().unwrap().len(), 1);

        assert!(store.delete_database(&db.id).unwrap());
        assert!(store.list_databases().unwrap().is_empty());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = MemStore::new();
        let a = store.create_database(new_db("db_a")).unwrap();
        let b = store.create_database(new_db("db_b")).unwrap();
        let c = store.create_database(new_db("db_c")).unwrap();

        let ids: Vec<String> = store
            .list_databases()
            .unwrap()
            .into_iter()
            .map(|db| db.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn operation_create_applies_defaults() {
        let store = MemStore::new();
        let op = store
            .create_operation(NewSyncOperation {
                database_id: None,
                operation: "sync".to_string(),
                status: None,
                records_processed: None,
                total_records: None,
                end_time: None,
                error_message: None,
            })
            .unwrap();

        assert_eq!(op.status, OperationStatus::Pending);
        assert_eq!(op.records_processed, 0);
        assert_eq!(op.total_records, 0);
        assert!(op.end_time.is_none());
        assert!(op.error_message.is_none());
    }

    #[test]
    fn finish_applies_only_to_running_operations() {
        let store = MemStore::new();
        let op = store
            .create_operation(NewSyncOperation {
                database_id: None,
                operation: "sync".to_string(),
                status: Some(OperationStatus::Running),
                records_processed: Some(0),
                total_records: Some(100),
                end_time: None,
                error_message: None,
            })
            .unwrap();

        let first = store
            .finish_operation(&op.id, OperationOutcome::Completed)
            .unwrap();
        let FinishResult::Applied(done) = first else {
            panic!("expected Applied, got {:?}", first);
        };
        assert_eq!(done.status, OperationStatus::Completed);
        assert_eq!(done.records_processed, 100);
        assert!(done.end_time.is_some());

        // The losing timer's attempt is a no-op, not a double write.
        let second = store
            .finish_operation(
                &op.id,
                OperationOutcome::Failed {
                    message: "too late".to_string(),
                },
            )
            .unwrap();
        assert!(matches!(second, FinishResult::NotRunning(_)));

        let current = store.get_operation(&op.id).unwrap().unwrap();
        assert_eq!(current.status, OperationStatus::Completed);
        assert!(current.error_message.is_none());
    }

    #[test]
    fn finish_ignores_pending_operations_and_missing_ids() {
        let store = MemStore::new();
        let pending = store
            .create_operation(NewSyncOperation {
                database_id: None,
                operation: "sync".to_string(),
                status: None,
                records_processed: None,
                total_records: None,
                end_time: None,
                error_message: None,
            })
            .unwrap();

        let result = store
            .finish_operation(&pending.id, OperationOutcome::Completed)
            .unwrap();
        assert!(matches!(result, FinishResult::NotRunning(_)));

        let missing = store
            .finish_operation("missing", OperationOutcome::Completed)
            .unwrap();
        assert_eq!(missing, FinishResult::NotFound);
    }

    #[test]
    fn changes_list_most_recent_first() {
        let store = MemStore::new();
        let t1 = store.create_change(new_change(None, "first")).unwrap();
        sleep(Duration::from_millis(2));
        let t2 = store.create_change(new_change(None, "second")).unwrap();
        sleep(Duration::from_millis(2));
        let t3 = store.create_change(new_change(None, "third")).unwrap();

        let ids: Vec<String> = store
            .list_changes(None)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![t3.id, t2.id, t1.id]);
    }

    #[test]
    fn changes_list_truncates_to_limit_and_default_page() {
        let store = MemStore::new();
        for i in 0..60 {
            store
                .create_change(new_change(None, &format!("change {}", i)))
                .unwrap();
        }

        assert_eq!(store.list_changes(Some(5)).unwrap().len(), 5);
        assert_eq!(store.list_changes(None).unwrap().len(), 50);
    }

    #[test]
    fn changes_filter_by_database_is_exact_and_unbounded() {
        let store = MemStore::new();
        for i in 0..55 {
            store
                .create_change(new_change(Some("db-1"), &format!("one {}", i)))
                .unwrap();
        }
        store.create_change(new_change(Some("db-2"), "other")).unwrap();
        store.create_change(new_change(None, "unscoped")).unwrap();

        let filtered = store.list_changes_by_database("db-1").unwrap();
        assert_eq!(filtered.len(), 55);
        assert!(filtered
            .iter()
            .all(|c| c.database_id.as_deref() == Some("db-1")));
    }

    #[test]
    fn settings_update_is_idempotent() {
        let store = MemStore::new();
        let patch = SyncSettingsPatch {
            auto_sync: Some(false),
            sync_interval: Some(15),
            access_token: Some(Some("secret".to_string())),
            ..Default::default()
        };

        let first = store.update_settings(patch.clone()).unwrap();
        let second = store.update_settings(patch).unwrap();
        assert_eq!(first, second);
        assert!(!second.auto_sync);
        assert_eq!(second.sync_interval, 15);
        assert_eq!(second.access_token.as_deref(), Some("secret"));
        // Untouched fields keep their defaults.
        assert_eq!(second.cache_size, 45);
    }

    #[test]
    fn seed_demo_data_populates_the_dashboard() {
        let store = MemStore::new();
        super::super::seed_demo_data(&store).unwrap();

        assert_eq!(store.list_databases().unwrap().len(), 2);
        assert_eq!(store.list_changes(None).unwrap().len(), 2);
        assert!(store.get_settings().unwrap().is_authenticated);
    }
}
