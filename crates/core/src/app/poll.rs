//! Background reload poll.
//!
//! Re-runs the full reload-and-reconcile pipeline on a fixed interval.
//! The task holds only a weak reference to the context: when the context
//! is gone, an in-flight tick's result is simply discarded and the task
//! ends - no panic, no retry.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::context::AppContext;

/// Spawns the poll task.
#[must_use]
pub fn spawn_poll(ctx: &Arc<AppContext>, interval: Duration) -> JoinHandle<()> {
    let weak: Weak<AppContext> = Arc::downgrade(ctx);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; bootstrap already loaded.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(ctx) = weak.upgrade() else {
                debug!("context dropped, poll task ending");
                break;
            };
            if let Err(err) = ctx.reload().await {
                // Field-level last-write-wins: the next successful tick
                // re-reads full rows, so a failed one is only logged.
                warn!(error = %err, "background reload failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use konsern_shared::types::GroupId;
    use konsern_store::{MemoryStore, TableStore, tables};
    use serde_json::json;
    use tokio::time::{sleep, timeout};

    use crate::budget::DeviationMode;

    #[tokio::test]
    async fn test_poll_picks_up_new_rows() {
        let store = Arc::new(MemoryStore::new());
        let ctx = AppContext::new(store.clone(), GroupId::new(1), DeviationMode::MonthEnd);
        ctx.bootstrap().await;
        assert!(ctx.cached_companies().await.is_empty());

        let handle = spawn_poll(&ctx, Duration::from_millis(10));

        let row: konsern_store::Row = [
            ("group_id".to_string(), json!(1)),
            ("name".to_string(), json!("New")),
        ]
        .into_iter()
        .collect();
        store
            .insert_rows(tables::COMPANIES, vec![row])
            .await
            .expect("insert succeeds");

        let mut found = false;
        for _ in 0..100 {
            if !ctx.cached_companies().await.is_empty() {
                found = true;
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        assert!(found, "poll never reconciled the new row");
        handle.abort();
    }

    #[tokio::test]
    async fn test_poll_ends_when_context_dropped() {
        let store = Arc::new(MemoryStore::new());
        let ctx = AppContext::new(store, GroupId::new(1), DeviationMode::MonthEnd);
        let handle = spawn_poll(&ctx, Duration::from_millis(5));

        drop(ctx);

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("poll task ends on its own")
            .expect("poll task does not panic");
    }
}
