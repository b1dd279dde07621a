//! App Core for TabKeeper.
//!
//! Wires the tab source, snapshot store, action executor and settings together
//! and dispatches user intents coming from a presentation layer.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::info;

use crate::managers::snapshot_store::SnapshotStore;
use crate::managers::tab_actions::TabActions;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::tab_derivation;
use crate::source::TabSource;
use crate::types::actions::{BatchReport, GroupOutcome};
use crate::types::errors::{SettingsError, TabError};
use crate::types::settings::TabKeeperSettings;
use crate::types::tab::{SnapshotStats, TabId, TabRecord};

/// A user-initiated trigger. Every intent is safe to repeat.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Search(String),
    ListTabs,
    Stats,
    GroupByDomain,
    CloseDuplicates,
    CloseOthers,
    SuspendInactive,
    Activate(TabId),
    Close(TabId),
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Tabs(Vec<TabRecord>),
    Stats(SnapshotStats),
    Grouped(Vec<GroupOutcome>),
    Batch(BatchReport),
    Done,
}

/// Central application struct.
pub struct App {
    source: Arc<dyn TabSource>,
    store: Arc<SnapshotStore>,
    actions: TabActions,
    settings_engine: Mutex<SettingsEngine>,
}

impl App {
    /// Builds the app around `source`. Call `start` before dispatching.
    pub fn new(source: Arc<dyn TabSource>, mut settings_engine: SettingsEngine) -> Self {
        if let Err(e) = settings_engine.load() {
            tracing::warn!(error = %e, "settings unreadable, using defaults");
        }
        let store = Arc::new(SnapshotStore::new(source.clone()));
        let actions = TabActions::new(source.clone(), store.clone());
        Self {
            source,
            store,
            actions,
            settings_engine: Mutex::new(settings_engine),
        }
    }

    /// Performs the startup reconciliation and starts reconciling on change notifications.
    ///
    /// Subscribes before the first fetch so no change between the two is missed.
    pub async fn start(&self) -> Result<JoinHandle<()>, TabError> {
        let events = self.source.subscribe();
        let snapshot = self.store.refresh().await?;
        info!(
            tabs = snapshot.tabs.len(),
            windows = snapshot.window_count,
            "initial snapshot loaded"
        );
        Ok(self.store.clone().watch(events))
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn actions(&self) -> &TabActions {
        &self.actions
    }

    fn settings_engine(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    pub fn settings(&self) -> TabKeeperSettings {
        self.settings_engine().get_settings().clone()
    }

    pub fn update_setting(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.settings_engine().set_value(key, value)
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<IntentOutcome, TabError> {
        match intent {
            Intent::Search(query) => Ok(IntentOutcome::Tabs(tab_derivation::filter_tabs(
                &self.store.snapshot(),
                &query,
            ))),
            Intent::ListTabs => Ok(IntentOutcome::Tabs(self.store.snapshot().tabs.clone())),
            Intent::Stats => Ok(IntentOutcome::Stats(self.store.stats())),
            Intent::GroupByDomain => {
                let collapsed = self.settings().grouping.collapse_groups;
                Ok(IntentOutcome::Grouped(
                    self.actions.group_by_domain(collapsed).await,
                ))
            }
            Intent::CloseDuplicates => Ok(IntentOutcome::Batch(
                self.actions.close_duplicates().await,
            )),
            Intent::CloseOthers => Ok(IntentOutcome::Batch(self.actions.close_others().await?)),
            Intent::SuspendInactive => {
                let limit = self.settings().suspension.batch_limit;
                Ok(IntentOutcome::Batch(
                    self.actions.suspend_inactive(limit).await,
                ))
            }
            Intent::Activate(tab_id) => {
                self.actions.activate(tab_id).await?;
                Ok(IntentOutcome::Done)
            }
            Intent::Close(tab_id) => {
                self.actions.close_tab(tab_id).await?;
                Ok(IntentOutcome::Done)
            }
            Intent::Refresh => {
                self.store.refresh().await?;
                Ok(IntentOutcome::Stats(self.store.stats()))
            }
        }
    }
}
