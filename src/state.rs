use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::bridge::manager::BridgeManager;
use crate::database::client::Database;

/// Process-wide state, built once at startup and passed to every consumer
/// explicitly.
pub struct AppState {
    pub db: Database,
    pub bridge: Arc<BridgeManager>,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AppState")
    }
}

pub fn create_app_state(db: Database, bridge: Arc<BridgeManager>) -> Arc<AppState> {
    Arc::new(AppState { db, bridge })
}
