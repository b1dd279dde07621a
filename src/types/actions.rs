use serde::Serialize;

use crate::types::errors::TabError;
use crate::types::tab::{GroupId, TabId};

/// Outcome of a best-effort batch: every member is attempted, failures are collected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<TabId>,
    pub failed: Vec<(TabId, TabError)>,
}

impl BatchReport {
    pub fn record(&mut self, tab_id: TabId, result: Result<(), TabError>) {
        match result {
            Ok(()) => self.succeeded.push(tab_id),
            Err(e) => self.failed.push((tab_id, e)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            succeeded: self.succeeded.clone(),
            failed: self
                .failed
                .iter()
                .map(|(id, e)| FailedItem {
                    id: *id,
                    error: e.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable view of a `BatchReport`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchSummary {
    pub succeeded: Vec<TabId>,
    pub failed: Vec<FailedItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedItem {
    pub id: TabId,
    pub error: String,
}

/// Result of grouping one domain's tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    pub domain: String,
    pub tab_ids: Vec<TabId>,
    pub result: Result<GroupId, TabError>,
}
