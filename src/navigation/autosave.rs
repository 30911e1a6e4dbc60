//! Periodic cursor persistence.
//!
//! A background thread snapshots the shared cursor on a fixed interval and
//! writes it through the gateway when it differs from the last write. Failures
//! are logged and retried on the next tick; they never reach the mutator.

use super::{CursorEntry, NavigationCursor};
use crate::store::persistence::PersistenceGateway;
use parking_lot::RwLock;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

pub struct CursorAutosave {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CursorAutosave {
    pub fn spawn(
        cursor: Arc<RwLock<NavigationCursor>>,
        gateway: PersistenceGateway,
        interval: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let mut last_saved: Option<Vec<CursorEntry>> = None;
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                let snapshot = cursor.read().snapshot();
                if last_saved.as_ref() == Some(&snapshot) {
                    continue;
                }
                match gateway.save_cursor(&snapshot) {
                    Ok(()) => {
                        debug!(depth = snapshot.len(), "Autosaved navigation cursor");
                        last_saved = Some(snapshot);
                    }
                    Err(e) => warn!(error = %e, "Cursor autosave failed"),
                }
            }
        });
        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the background thread and wait for it to exit
    pub fn stop(&mut self) {
        // dropping the sender wakes the thread
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Cursor autosave thread panicked");
            }
        }
    }
}

impl Drop for CursorAutosave {
    fn drop(&mut self) {
        self.stop();
    }
}
