//! Best-effort activity logging.
//!
//! Mutations record audit events through a bounded queue drained by a
//! background task. The decoupling is the point: a slow or failing log
//! write never affects the user-facing outcome of the mutation, and a
//! full queue drops the event rather than blocking the mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use konsern_store::{Row, TableStore, tables};

/// Default queue depth before events are dropped.
const DEFAULT_CAPACITY: usize = 256;

/// One audit event.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    /// Who acted.
    pub user_name: String,
    /// What happened, e.g. "report_submitted".
    pub action: String,
    /// Free-text detail.
    pub details: String,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    fn into_row(self) -> Row {
        let mut row = Row::new();
        row.insert("user_name".into(), Value::String(self.user_name));
        row.insert("action".into(), Value::String(self.action));
        row.insert("details".into(), Value::String(self.details));
        row.insert("timestamp".into(), Value::String(self.timestamp.to_rfc3339()));
        row
    }
}

/// Sending half of the audit channel. Cheap to clone.
#[derive(Clone)]
pub struct ActivityHandle {
    tx: mpsc::Sender<ActivityEvent>,
}

impl ActivityHandle {
    /// Spawns the drain task over a storage backend with the default
    /// queue depth.
    #[must_use]
    pub fn spawn(store: Arc<dyn TableStore>) -> Self {
        Self::spawn_with_capacity(store, DEFAULT_CAPACITY)
    }

    /// Spawns the drain task with an explicit queue depth.
    #[must_use]
    pub fn spawn_with_capacity(store: Arc<dyn TableStore>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(drain(store, rx));
        Self { tx }
    }

    /// Enqueues an audit event. Never blocks, never fails the caller.
    pub fn record(
        &self,
        user_name: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) {
        let event = ActivityEvent {
            user_name: user_name.into(),
            action: action.into(),
            details: details.into(),
            timestamp: Utc::now(),
        };
        if let Err(err) = self.tx.try_send(event) {
            warn!(error = %err, "activity queue full, dropping event");
        }
    }
}

async fn drain(store: Arc<dyn TableStore>, mut rx: mpsc::Receiver<ActivityEvent>) {
    while let Some(event) = rx.recv().await {
        if let Err(err) = store
            .insert_rows(tables::ACTIVITY_LOG, vec![event.into_row()])
            .await
        {
            warn!(error = %err, "activity log write failed, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use konsern_store::{MemoryStore, RowFilter};
    use tokio::time::{Duration, sleep};

    #[tokio::test]
    async fn test_recorded_events_reach_storage() {
        let store = Arc::new(MemoryStore::new());
        let handle = ActivityHandle::spawn(store.clone());

        handle.record("Kari", "report_approved", "report 3");

        // The drain task runs asynchronously; give it a few turns.
        let mut rows = Vec::new();
        for _ in 0..50 {
            rows = store
                .fetch_rows(tables::ACTIVITY_LOG, &RowFilter::all())
                .await
                .expect("fetch succeeds");
            if !rows.is_empty() {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("action"),
            Some(&serde_json::json!("report_approved"))
        );
        assert_eq!(rows[0].get("user_name"), Some(&serde_json::json!("Kari")));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let store = Arc::new(MemoryStore::new());
        let handle = ActivityHandle::spawn_with_capacity(store, 1);

        // Recording more than fits must return immediately either way.
        for i in 0..10 {
            handle.record("Kari", "edit", format!("edit {i}"));
        }
    }
}
