//! Wire and domain types shared by the store, the simulator, and the
//! controllers. All records serialize as camelCase JSON — the contract the
//! dashboard frontend consumes.

mod change;
mod database;
mod operation;
mod settings;

pub use change::{ChangeAction, ChangeStatus, DataChange, NewDataChange};
pub use database::{
    DatabaseStatus, ExternalDatabase, ExternalDatabasePatch, NewExternalDatabase, SyncDirection,
};
pub use operation::{NewSyncOperation, OperationStatus, SyncOperation, SyncOperationPatch};
pub use settings::{SyncSettings, SyncSettingsPatch};
