//! Snapshot Store for TabKeeper.
//!
//! Holds the last snapshot fetched from the tab source and reconciles it by
//! wholesale refetch. At most one refresh runs at a time; a caller that asks
//! for a refresh while another is in flight either waits its turn or, when a
//! refresh that started after its request has already finished, reuses that
//! result. Readers always see a complete snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::services::tab_derivation;
use crate::source::TabSource;
use crate::types::errors::TabError;
use crate::types::tab::{Snapshot, SnapshotStats, TabEvent, TabQuery};

pub struct SnapshotStore {
    source: Arc<dyn TabSource>,
    current: RwLock<Arc<Snapshot>>,
    refresh_gate: Mutex<()>,
    /// Ticket counter for refresh requests.
    requested: AtomicU64,
    /// Highest ticket whose request predates a completed fetch.
    covered: AtomicU64,
}

impl SnapshotStore {
    pub fn new(source: Arc<dyn TabSource>) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(Snapshot::default())),
            refresh_gate: Mutex::new(()),
            requested: AtomicU64::new(0),
            covered: AtomicU64::new(0),
        }
    }

    /// Returns the current snapshot. Cheap; the snapshot itself is never mutated.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn stats(&self) -> SnapshotStats {
        tab_derivation::stats(&self.snapshot())
    }

    /// Refetches every tab and window and swaps in a new snapshot.
    ///
    /// On failure the previous snapshot stays in place and the error is returned.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, TabError> {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _gate = self.refresh_gate.lock().await;

        if self.covered.load(Ordering::SeqCst) >= ticket {
            debug!(ticket, "refresh coalesced into a later pass");
            return Ok(self.snapshot());
        }

        // Every request issued up to here is satisfied by the fetch below.
        let covers = self.requested.load(Ordering::SeqCst);

        let tabs = match self.source.query_tabs(&TabQuery::default()).await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping last snapshot");
                return Err(e);
            }
        };
        let windows = match self.source.query_windows().await {
            Ok(windows) => windows,
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping last snapshot");
                return Err(e);
            }
        };

        let generation = self.snapshot().generation + 1;
        let snapshot = Arc::new(Snapshot {
            tabs,
            window_count: windows.len(),
            generation,
        });
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = snapshot.clone();
        self.covered.store(covers, Ordering::SeqCst);

        debug!(
            generation,
            tabs = snapshot.tabs.len(),
            windows = snapshot.window_count,
            "snapshot refreshed"
        );
        Ok(snapshot)
    }

    /// Reconciles on every change notification until the stream closes.
    ///
    /// Notifications already queued when a pass starts are folded into it;
    /// anything arriving during the pass triggers another one. A lagged stream
    /// counts as a change.
    pub fn watch(self: Arc<Self>, mut events: broadcast::Receiver<TabEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }

                let mut folded = 0usize;
                loop {
                    match events.try_recv() {
                        Ok(_) | Err(TryRecvError::Lagged(_)) => folded += 1,
                        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                    }
                }
                if folded > 0 {
                    debug!(folded, "coalesced change notifications");
                }

                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "reconciliation after change notification failed");
                }
            }
            debug!("change stream closed, watcher exiting");
        })
    }
}
