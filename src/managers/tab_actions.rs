//! Action Executor for TabKeeper.
//!
//! Turns derived views into tab source mutations. Every command that touches
//! the source is followed by a reconciliation, whether or not it succeeded.
//! Batch commands are best-effort: one failing member never stops the rest.

use std::sync::Arc;

use tracing::{info, warn};

use crate::managers::snapshot_store::SnapshotStore;
use crate::services::tab_derivation;
use crate::source::TabSource;
use crate::types::actions::{BatchReport, GroupOutcome};
use crate::types::errors::TabError;
use crate::types::tab::{GroupId, GroupUpdate, TabId, TabQuery, TabRecord, TabUpdate, WindowUpdate};

/// Command layer over a tab source and its snapshot store.
pub struct TabActions {
    source: Arc<dyn TabSource>,
    store: Arc<SnapshotStore>,
}

impl TabActions {
    pub fn new(source: Arc<dyn TabSource>, store: Arc<SnapshotStore>) -> Self {
        Self { source, store }
    }

    async fn reconcile(&self) {
        if let Err(e) = self.store.refresh().await {
            warn!(error = %e, "reconciliation after mutation failed");
        }
    }

    pub async fn close_tab(&self, tab_id: TabId) -> Result<(), TabError> {
        let result = self.source.remove_tab(tab_id).await;
        if let Err(e) = &result {
            warn!(tab_id, error = %e, "close failed");
        }
        self.reconcile().await;
        result
    }

    /// Closes every id it can. An empty list issues nothing and skips reconciliation.
    pub async fn close_tabs(&self, tab_ids: &[TabId]) -> BatchReport {
        if tab_ids.is_empty() {
            return BatchReport::default();
        }
        let report = self.source.remove_tabs(tab_ids).await;
        for (tab_id, e) in &report.failed {
            warn!(tab_id = *tab_id, error = %e, "close failed");
        }
        self.reconcile().await;
        report
    }

    /// Activates the tab, then focuses its window.
    pub async fn activate(&self, tab_id: TabId) -> Result<(), TabError> {
        let result = self.focus(tab_id).await;
        if let Err(e) = &result {
            warn!(tab_id, error = %e, "activate failed");
        }
        self.reconcile().await;
        result
    }

    async fn focus(&self, tab_id: TabId) -> Result<(), TabError> {
        let tab = self
            .source
            .update_tab(tab_id, TabUpdate { active: Some(true) })
            .await?;
        self.source
            .update_window(tab.window_id, WindowUpdate { focused: Some(true) })
            .await?;
        Ok(())
    }

    /// Puts every shared domain of the current snapshot into its own labeled group.
    pub async fn group_by_domain(&self, collapsed: bool) -> Vec<GroupOutcome> {
        let plan = tab_derivation::plan_groups(&self.store.snapshot());
        info!(domains = plan.len(), "grouping tabs by domain");

        let mut outcomes = Vec::with_capacity(plan.len());
        for (domain, tab_ids) in plan {
            let result = self.group_domain(&domain, &tab_ids, collapsed).await;
            if let Err(e) = &result {
                warn!(domain = %domain, error = %e, "grouping failed");
            }
            outcomes.push(GroupOutcome {
                domain,
                tab_ids,
                result,
            });
        }

        self.reconcile().await;
        outcomes
    }

    async fn group_domain(
        &self,
        domain: &str,
        tab_ids: &[TabId],
        collapsed: bool,
    ) -> Result<GroupId, TabError> {
        let group_id = self.source.group_tabs(tab_ids).await?;
        self.source
            .update_group(
                group_id,
                GroupUpdate {
                    title: Some(domain.to_string()),
                    collapsed: Some(collapsed),
                },
            )
            .await?;
        Ok(group_id)
    }

    pub async fn close_duplicates(&self) -> BatchReport {
        let duplicates = tab_derivation::find_duplicates(&self.store.snapshot());
        info!(count = duplicates.len(), "closing duplicate tabs");
        self.close_tabs(duplicates.ids()).await
    }

    /// Closes every other tab in the current window.
    ///
    /// Fails before touching anything when the current tab cannot be resolved.
    pub async fn close_others(&self) -> Result<BatchReport, TabError> {
        let current = self.resolve_current_tab().await?;
        let others =
            tab_derivation::others_in_window(&self.store.snapshot(), current.id, current.window_id);
        info!(count = others.len(), keep = current.id, "closing other tabs");
        Ok(self.close_tabs(&others).await)
    }

    /// The focused tab of the focused window, as the source reports it right now.
    pub async fn resolve_current_tab(&self) -> Result<TabRecord, TabError> {
        let tabs = self
            .source
            .query_tabs(&TabQuery::current_tab())
            .await
            .map_err(|e| TabError::ResolutionFailure(e.to_string()))?;
        tabs.into_iter().next().ok_or_else(|| {
            TabError::ResolutionFailure("no active tab in the current window".to_string())
        })
    }

    /// Discards up to `limit` inactive, silent tabs.
    pub async fn suspend_inactive(&self, limit: usize) -> BatchReport {
        let candidates = tab_derivation::suspension_candidates(&self.store.snapshot(), limit);
        info!(count = candidates.len(), limit, "suspending inactive tabs");

        let mut report = BatchReport::default();
        for tab_id in candidates {
            let result = self.source.discard_tab(tab_id).await;
            if let Err(e) = &result {
                warn!(tab_id, error = %e, "discard failed");
            }
            report.record(tab_id, result);
        }

        self.reconcile().await;
        report
    }
}
