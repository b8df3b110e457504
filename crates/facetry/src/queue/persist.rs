//! Debounced persistence of the selection queue.
//!
//! A background task owns the write side. Every reported change restarts
//! the debounce window and only the newest snapshot in a burst is saved.
//! Changes reported before [`QueuePersister::restore`] finished are dropped
//! so an empty startup state can never clobber the stored queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{QueueError, SelectionQueue};
use crate::db::{queue_repo, Database};

/// Where queues are stored.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Vec<String>, QueueError>;
    async fn save(&self, user_id: &str, ids: &[String]) -> Result<(), QueueError>;
}

#[async_trait]
impl QueueStore for Database {
    async fn load(&self, user_id: &str) -> Result<Vec<String>, QueueError> {
        Ok(queue_repo::load(self, user_id)?)
    }

    async fn save(&self, user_id: &str, ids: &[String]) -> Result<(), QueueError> {
        Ok(queue_repo::upsert(self, user_id, ids)?)
    }
}

enum Command {
    Changed(Vec<String>),
    Flush(oneshot::Sender<()>),
    Cancel,
}

pub struct QueuePersister {
    store: Arc<dyn QueueStore>,
    user_id: String,
    loaded: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
}

impl QueuePersister {
    /// Spawns the write task. Must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn QueueStore>, user_id: impl Into<String>, debounce: Duration) -> Self {
        let user_id = user_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(Arc::clone(&store), user_id.clone(), debounce, rx));
        Self {
            store,
            user_id,
            loaded: Arc::new(AtomicBool::new(false)),
            tx,
            worker,
        }
    }

    /// Loads the stored queue and opens the gate for saves.
    pub async fn restore(&self) -> Result<SelectionQueue, QueueError> {
        let ids = self.store.load(&self.user_id).await?;
        self.loaded.store(true, Ordering::Release);
        debug!(user_id = %self.user_id, count = ids.len(), "Selection queue restored");
        Ok(ids.into_iter().collect())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Reports the queue's new contents. Returns false if the change was
    /// dropped because the initial load has not completed yet.
    pub fn queue_changed(&self, queue: &SelectionQueue) -> bool {
        if !self.is_loaded() {
            debug!("Ignoring queue change before initial load");
            return false;
        }
        self.tx.send(Command::Changed(queue.ids())).is_ok()
    }

    /// Writes any pending snapshot now and waits for it.
    pub async fn flush(&self) -> Result<(), QueueError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| QueueError::Closed)?;
        ack_rx.await.map_err(|_| QueueError::Closed)
    }

    /// Drops any pending snapshot without writing it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }
}

impl Drop for QueuePersister {
    fn drop(&mut self) {
        // Teardown: pending writes are discarded, never performed late.
        self.worker.abort();
    }
}

async fn save(store: &dyn QueueStore, user_id: &str, ids: &[String]) {
    match store.save(user_id, ids).await {
        Ok(()) => debug!(user_id, count = ids.len(), "Selection queue saved"),
        Err(e) => warn!(user_id, "Failed to save selection queue: {}", e),
    }
}

async fn run(
    store: Arc<dyn QueueStore>,
    user_id: String,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(cmd) = rx.recv().await {
        let mut pending = match cmd {
            Command::Changed(ids) => ids,
            Command::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
            Command::Cancel => continue,
        };

        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(Command::Changed(ids)) => pending = ids,
                    Some(Command::Flush(ack)) => {
                        save(store.as_ref(), &user_id, &pending).await;
                        let _ = ack.send(());
                        break;
                    }
                    Some(Command::Cancel) | None => break,
                },
                _ = tokio::time::sleep(debounce) => {
                    save(store.as_ref(), &user_id, &pending).await;
                    break;
                }
            }
        }
    }
}
