//! Debounced autosave.
//!
//! Every tree change sends a snapshot to the worker, which restarts its
//! timer. When the timer runs out the latest snapshot is written once;
//! anything older is dropped. Saves run one after another on a blocking
//! thread and failures are logged, never retried. Immediate saves go
//! through the same worker so two writes never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::storage::{Document, DocumentStore};

/// Default quiet period before a save
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
enum AutosaveMessage {
    /// A new snapshot replaced the pending one
    Changed(Document),
    /// Initial load finished; snapshots are accepted from now on
    Loaded,
    /// Save the pending snapshot now and report back
    Flush(oneshot::Sender<()>),
    /// Save this snapshot now, replacing any pending one
    SaveNow(Document, oneshot::Sender<bool>),
    /// Flush and stop
    Shutdown,
}

/// Handle used by the tree owner
#[derive(Debug, Clone)]
pub struct AutosaveController {
    sender: mpsc::UnboundedSender<AutosaveMessage>,
}

/// The background half; run it on the async runtime
pub struct AutosaveWorker {
    store: Arc<dyn DocumentStore>,
    debounce: Duration,
    receiver: mpsc::UnboundedReceiver<AutosaveMessage>,
}

impl AutosaveController {
    pub fn new(store: Arc<dyn DocumentStore>, debounce: Duration) -> (Self, AutosaveWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = AutosaveWorker {
            store,
            debounce,
            receiver,
        };
        (Self { sender }, worker)
    }

    /// Report a tree change
    pub fn notify(&self, snapshot: Document) {
        if self.sender.send(AutosaveMessage::Changed(snapshot)).is_err() {
            log::warn!("Autosave worker is gone, change not scheduled");
        }
    }

    /// Allow saves; snapshots sent before this are ignored
    pub fn mark_loaded(&self) {
        let _ = self.sender.send(AutosaveMessage::Loaded);
    }

    /// Write any pending snapshot and wait until it is on disk
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(AutosaveMessage::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Write `snapshot` right away. Returns whether the write succeeded.
    pub async fn save_now(&self, snapshot: Document) -> bool {
        let (ack, done) = oneshot::channel();
        if self.sender.send(AutosaveMessage::SaveNow(snapshot, ack)).is_err() {
            log::error!("Autosave worker is gone, document not saved");
            return false;
        }
        done.await.unwrap_or(false)
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(AutosaveMessage::Shutdown);
    }
}

impl AutosaveWorker {
    pub async fn run(mut self) {
        log::info!("Autosave started (debounce={}ms)", self.debounce.as_millis());

        let mut loaded = false;
        let mut pending: Option<Document> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let timer = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                msg = self.receiver.recv() => {
                    match msg {
                        Some(AutosaveMessage::Changed(snapshot)) => {
                            if !loaded {
                                log::debug!("Autosave: ignoring change during initial load");
                                continue;
                            }
                            pending = Some(snapshot);
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        Some(AutosaveMessage::Loaded) => {
                            loaded = true;
                        }
                        Some(AutosaveMessage::Flush(ack)) => {
                            deadline = None;
                            if let Some(snapshot) = pending.take() {
                                self.save(snapshot).await;
                            }
                            let _ = ack.send(());
                        }
                        Some(AutosaveMessage::SaveNow(snapshot, ack)) => {
                            deadline = None;
                            pending = None;
                            let saved = self.save(snapshot).await;
                            let _ = ack.send(saved);
                        }
                        Some(AutosaveMessage::Shutdown) | None => {
                            if let Some(snapshot) = pending.take() {
                                self.save(snapshot).await;
                            }
                            log::info!("Autosave: shutting down");
                            break;
                        }
                    }
                }

                _ = timer => {
                    deadline = None;
                    if let Some(snapshot) = pending.take() {
                        self.save(snapshot).await;
                    }
                }
            }
        }
    }

    async fn save(&self, snapshot: Document) -> bool {
        let store = Arc::clone(&self.store);
        let pages = snapshot.page_count();
        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {
                log::debug!("Autosave: saved {} pages", pages);
                true
            }
            Ok(Err(e)) => {
                log::error!("Autosave failed: {}", e);
                false
            }
            Err(e) => {
                log::error!("Autosave task failed: {}", e);
                false
            }
        }
    }
}
