//! Persistence layer for the game server.
//!
//! Game actions never wait on disk. Snapshots of the player table are handed
//! to a background task that writes the JSON document, newest snapshot wins.

mod repository;
mod store;

pub use repository::{InMemoryRepository, PlayerRepository};
pub use store::{JsonStore, PlayerMap, StoreError};

use log::{error, info, warn};
use tokio::sync::{mpsc, oneshot};

/// Queued commands before saves start being dropped
const CHANNEL_CAPACITY: usize = 64;

/// Commands sent to the persistence background task
#[derive(Debug)]
pub enum PersistenceCommand {
    /// Write this snapshot of every player
    SaveAll(PlayerMap),
    /// Reply once everything queued before it is written; `true` if the last write succeeded
    Flush(oneshot::Sender<bool>),
    /// Write what is pending and stop
    Shutdown,
}

/// Handle for sending commands to the persistence task
#[derive(Clone)]
pub struct PersistenceHandle {
    sender: mpsc::Sender<PersistenceCommand>,
}

impl PersistenceHandle {
    /// Queue a snapshot (fire and forget - non-blocking)
    pub fn save_all(&self, snapshot: PlayerMap) {
        if let Err(e) = self.sender.try_send(PersistenceCommand::SaveAll(snapshot)) {
            error!("Dropped player snapshot: {}", e);
        }
    }

    /// Wait until every queued snapshot is on disk
    pub async fn flush(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(PersistenceCommand::Flush(tx)).await.is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Write everything queued, then stop the persistence task
    pub async fn shutdown(&self) {
        if !self.flush().await {
            warn!("Final save before shutdown did not succeed");
        }
        let _ = self.sender.send(PersistenceCommand::Shutdown).await;
    }
}

/// Spawn the background writer. Must be called inside a tokio runtime.
pub fn init(store: JsonStore) -> PersistenceHandle {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(persistence_task(store, rx));
    info!("Persistence background task started");
    PersistenceHandle { sender: tx }
}

/// Background task that owns all writes to the store
async fn persistence_task(store: JsonStore, mut rx: mpsc::Receiver<PersistenceCommand>) {
    info!("Persistence task running on {}", store.path().display());
    let mut last_write_ok = true;

    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut waiting = Vec::new();
        let mut shutdown = false;

        // Coalesce everything already queued into one write
        let mut next = Some(first);
        while let Some(cmd) = next {
            match cmd {
                PersistenceCommand::SaveAll(snapshot) => latest = Some(snapshot),
                PersistenceCommand::Flush(response) => waiting.push(response),
                PersistenceCommand::Shutdown => shutdown = true,
            }
            next = rx.try_recv().ok();
        }

        if let Some(snapshot) = latest {
            last_write_ok = write_snapshot(&store, snapshot).await;
        }
        for response in waiting {
            let _ = response.send(last_write_ok);
        }

        if shutdown {
            info!("Persistence task shutting down");
            break;
        }
    }

    info!("Persistence task stopped");
}

async fn write_snapshot(store: &JsonStore, snapshot: PlayerMap) -> bool {
    let store = store.clone();
    let count = snapshot.len();
    match tokio::task::spawn_blocking(move || store.save_all_players(&snapshot)).await {
        Ok(Ok(())) => {
            info!("Saved {} players", count);
            true
        }
        Ok(Err(e)) => {
            error!("Failed to save players: {}", e);
            false
        }
        Err(e) => {
            warn!("Save task did not complete: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpg_shared::PlayerState;

    fn snapshot_with_gold(gold: u64) -> PlayerMap {
        let mut players = PlayerMap::new();
        players.insert(
            "1".into(),
            PlayerState {
                id: "1".into(),
                gold,
                ..Default::default()
            },
        );
        players
    }

    #[tokio::test]
    async fn test_flush_writes_newest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let handle = init(store.clone());

        handle.save_all(snapshot_with_gold(1));
        handle.save_all(snapshot_with_gold(2));
        handle.save_all(snapshot_with_gold(3));
        assert!(handle.flush().await);

        assert_eq!(store.load_all_players()["1"].gold, 3);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_writes_pending_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let handle = init(store.clone());

        handle.save_all(snapshot_with_gold(7));
        handle.shutdown().await;

        assert_eq!(store.load_all_players()["1"].gold, 7);
    }
}
