//! Background sweeper that physically removes expired items.
//!
//! Reads already hide expired items; the sweeper only reclaims their storage.
//! It runs as a tokio task and stops when its handle is dropped.

use crate::Database;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Handle to the running sweeper task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl SweeperHandle {
    /// Spawn the sweeper on the current tokio runtime.
    ///
    /// # Arguments
    /// - `db`: Shared database handle.
    /// - `interval`: Delay between sweeps.
    ///
    /// # Returns
    /// A handle that stops the sweeper on [`SweeperHandle::stop`] or drop.
    pub fn start(db: Arc<Database>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(sweep_loop(db, interval, shutdown_rx));
        info!(interval_secs = interval.as_secs(), "Background sweeper started");
        Self { shutdown_tx }
    }

    /// Signal the sweeper to stop. Safe to call more than once.
    pub fn stop(&self) {
        if !*self.shutdown_tx.borrow() {
            let _ = self.shutdown_tx.send(true);
            info!("Background sweeper stopped");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweep_loop(db: Arc<Database>, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Sweeper received shutdown signal");
                    return;
                }
            }
        }

        let db = db.clone();
        match tokio::task::spawn_blocking(move || db.items.sweep(Utc::now())).await {
            Ok(Ok(0)) => debug!("Sweep found nothing to remove"),
            Ok(Ok(removed)) => info!(removed, "Swept expired items"),
            Ok(Err(err)) => warn!("Sweep failed: {}", err),
            Err(err) => warn!("Sweep task failed: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::CreateItemRequest;
    use tempfile::TempDir;

    fn setup_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let db_path = temp_dir.path().join("db");
        let db = Database::new(db_path.to_str().expect("db path")).expect("db");
        (Arc::new(db), temp_dir)
    }

    fn create_short_lived(db: &Database, ttl_ms: i64) -> String {
        let now = Utc::now();
        db.items
            .create(
                CreateItemRequest {
                    content: "short lived".to_string(),
                    password: None,
                    expires_at: Some(now + chrono::Duration::milliseconds(ttl_ms)),
                },
                now,
            )
            .expect("create")
    }

    #[tokio::test]
    async fn sweeper_removes_expired_items() {
        let (db, _temp) = setup_db();
        create_short_lived(&db, 50);
        let sweeper = SweeperHandle::start(db.clone(), Duration::from_millis(20));

        let mut emptied = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if db.items.is_empty().expect("is_empty") {
                emptied = true;
                break;
            }
        }
        sweeper.stop();
        assert!(emptied, "expired item should be swept");
    }

    #[tokio::test]
    async fn stopped_sweeper_leaves_rows_in_place() {
        let (db, _temp) = setup_db();
        create_short_lived(&db, 50);
        let sweeper = SweeperHandle::start(db.clone(), Duration::from_millis(200));
        drop(sweeper);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(db.items.len().expect("len"), 1);
    }

    #[tokio::test]
    async fn sweeper_keeps_live_items() {
        let (db, _temp) = setup_db();
        create_short_lived(&db, 60_000);
        let sweeper = SweeperHandle::start(db.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.stop();
        sweeper.stop();
        assert_eq!(db.items.len().expect("len"), 1);
    }
}
