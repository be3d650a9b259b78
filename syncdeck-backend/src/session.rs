//! Process-local workspace session state.
//!
//! The access token and workspace identity obtained from the OAuth exchange
//! live here, in memory only — they are never written to the entity store
//! and do not survive a restart.

use parking_lot::RwLock;

#[derive(Debug, Clone)]
pub struct WorkspaceSession {
    pub access_token: String,
    pub workspace_id: Option<String>,
    pub bot_id: Option<String>,
}

#[derive(Default)]
pub struct SessionState {
    current: RwLock<Option<WorkspaceSession>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, session: WorkspaceSession) {
        *self.current.write() = Some(session);
    }

    pub fn disconnect(&self) {
        *self.current.write() = None;
    }

    pub fn snapshot(&self) -> Option<WorkspaceSession> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }
}
