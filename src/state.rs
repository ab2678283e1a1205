use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::sync::{broadcast, watch};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::IntakeEvent;
use crate::services::extractor::SlotExtractor;

pub struct AppState {
    pub db: Mutex<Connection>,
    pub config: AppConfig,
    pub extractor: SlotExtractor,
    pub events_tx: broadcast::Sender<IntakeEvent>,
    pub shutdown_tx: watch::Sender<bool>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        let extractor = SlotExtractor::new().with_date_normalization(config.normalize_dates);
        let (events_tx, _) = broadcast::channel(256);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            db: Mutex::new(conn),
            config,
            extractor,
            events_tx,
            shutdown_tx,
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db.lock().map_err(|_| AppError::StateUnavailable)
    }

    /// Hand the connection back for an explicit close at shutdown.
    pub fn into_connection(self) -> Connection {
        self.db.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ends open `/events` streams.
    pub fn begin_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Fan out to `/events` subscribers; dropped silently when nobody listens.
    pub fn publish(&self, event: IntakeEvent) {
        let _ = self.events_tx.send(event);
    }
}
