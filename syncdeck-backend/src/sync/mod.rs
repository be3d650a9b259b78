//! Sync-operation lifecycle: trigger, simulated completion, timeout net.
//!
//! Triggering a sync creates a running operation and returns it without
//! waiting. Two timers then race for the terminal state: the completion
//! timer (normal path) and a timeout watchdog (safety net). Both go through
//! the store's compare-and-swap `finish_operation`, so whichever fires
//! second is a no-op. The watchdog is disarmed via a cancellation token once
//! a finish attempt lands.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::models::{NewSyncOperation, OperationStatus, SyncOperation};
use crate::store::{FinishResult, OperationOutcome, StoreResult, SyncStore};

/// Simulated workload size for a triggered sync. Progress jumps from 0 to
/// this value at completion; there is no proportional reporting.
pub const SIMULATED_TOTAL_RECORDS: i64 = 100;
/// Delay before the simulated sync reports completion.
const COMPLETION_DELAY: Duration = Duration::from_secs(2);
/// Ceiling after which a still-running operation is forced to failed.
const TIMEOUT_CEILING: Duration = Duration::from_secs(30);

pub struct SyncRunner {
    store: Arc<dyn SyncStore>,
    completion_delay: Duration,
    timeout_ceiling: Duration,
}

impl SyncRunner {
    pub fn new(store: Arc<dyn SyncStore>) -> Self {
        Self::with_timings(store, COMPLETION_DELAY, TIMEOUT_CEILING)
    }

    pub fn with_timings(
        store: Arc<dyn SyncStore>,
        completion_delay: Duration,
        timeout_ceiling: Duration,
    ) -> Self {
        Self {
            store,
            completion_delay,
            timeout_ceiling,
        }
    }

    /// Create a running operation and hand it back immediately; completion
    /// and timeout handling continue on spawned timers.
    pub fn trigger(
        &self,
        database_id: Option<String>,
        operation: Option<String>,
    ) -> StoreResult<SyncOperation> {
        let op = self.store.create_operation(NewSyncOperation {
            database_id,
            operation: operation.unwrap_or_else(|| "sync".to_string()),
            status: Some(OperationStatus::Running),
            records_processed: Some(0),
            total_records: Some(SIMULATED_TOTAL_RECORDS),
            end_time: None,
            error_message: None,
        })?;

        let settled = CancellationToken::new();
        self.spawn_watchdog(op.id.clone(), settled.clone());
        self.spawn_completion(op.id.clone(), settled);

        Ok(op)
    }

    /// Safety net: if no terminal state landed within the ceiling, force the
    /// operation to failed. Disarmed through `settled`.
    fn spawn_watchdog(&self, id: String, settled: CancellationToken) {
        let store = Arc::clone(&self.store);
        let ceiling = self.timeout_ceiling;
        tokio::spawn(async move {
            tokio::select! {
                _ = settled.cancelled() => {}
                _ = tokio::time::sleep(ceiling) => {
                    let outcome = OperationOutcome::Failed {
                        message: "Sync operation timed out".to_string(),
                    };
                    match store.finish_operation(&id, outcome) {
                        Ok(FinishResult::Applied(_)) => {
                            log::warn!("sync operation {} timed out after {:?}", id, ceiling);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            // Nothing left to catch this; log-only tail.
                            log::error!("failed to handle sync timeout for {}: {}", id, e);
                        }
                    }
                }
            }
        });
    }

    fn spawn_completion(&self, id: String, settled: CancellationToken) {
        let store = Arc::clone(&self.store);
        let delay = self.completion_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match store.finish_operation(&id, OperationOutcome::Completed) {
                Ok(_) => settled.cancel(),
                Err(e) => {
                    log::error!("failed to complete sync operation {}: {}", id, e);
                    let fallback = OperationOutcome::Failed {
                        message: "Sync operation failed".to_string(),
                    };
                    match store.finish_operation(&id, fallback) {
                        Ok(_) => settled.cancel(),
                        Err(e) => {
                            // Leave the watchdog armed; it is the last net.
                            log::error!("failed to mark sync operation {} as failed: {}", id, e);
                        }
                    }
                }
            }
        });
    }
}
