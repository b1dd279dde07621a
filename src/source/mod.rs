//! Tab Source boundary.
//!
//! The host's live tab/window registry. Every call may suspend, and change
//! notifications arrive with no ordering guarantee relative to in-flight queries.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::types::actions::BatchReport;
use crate::types::errors::TabError;
use crate::types::tab::{
    GroupId, GroupUpdate, TabEvent, TabId, TabQuery, TabRecord, TabUpdate, WindowId,
    WindowRecord, WindowUpdate,
};

/// Trait defining the capabilities consumed from the host tab registry.
#[async_trait]
pub trait TabSource: Send + Sync {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabRecord>, TabError>;
    async fn query_windows(&self) -> Result<Vec<WindowRecord>, TabError>;
    async fn update_tab(&self, tab_id: TabId, update: TabUpdate) -> Result<TabRecord, TabError>;
    async fn update_window(
        &self,
        window_id: WindowId,
        update: WindowUpdate,
    ) -> Result<WindowRecord, TabError>;
    async fn remove_tab(&self, tab_id: TabId) -> Result<(), TabError>;
    async fn group_tabs(&self, tab_ids: &[TabId]) -> Result<GroupId, TabError>;
    async fn update_group(&self, group_id: GroupId, update: GroupUpdate) -> Result<(), TabError>;
    async fn discard_tab(&self, tab_id: TabId) -> Result<(), TabError>;

    /// Subscribes to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<TabEvent>;

    /// Removes every id, continuing past ids that fail.
    async fn remove_tabs(&self, tab_ids: &[TabId]) -> BatchReport {
        let mut report = BatchReport::default();
        for &tab_id in tab_ids {
            let result = self.remove_tab(tab_id).await;
            report.record(tab_id, result);
        }
        report
    }
}
