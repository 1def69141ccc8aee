use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::notify::NotificationSink;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub notifier: Box<dyn NotificationSink>,
}

impl AppState {
    /// Locks the shared connection. A poisoned lock still hands back the
    /// connection: each statement commits or rolls back on its own.
    pub fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
