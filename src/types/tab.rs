use serde::{Deserialize, Serialize};

/// Host-assigned tab identifier. Unique among open tabs only; the host may reuse it.
pub type TabId = i64;

/// Host-assigned window identifier.
pub type WindowId = i64;

/// Host-assigned tab group identifier.
pub type GroupId = i64;

/// One open tab as reported by the tab source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub window_id: WindowId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub audible: bool,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub discarded: bool,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl TabRecord {
    /// Builds an inactive, silent record with an empty title.
    pub fn new(id: TabId, window_id: WindowId, url: &str) -> Self {
        Self {
            id,
            window_id,
            url: url.to_string(),
            title: String::new(),
            active: false,
            audible: false,
            fav_icon_url: None,
            discarded: false,
            group_id: None,
        }
    }
}

/// One browser window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowRecord {
    pub id: WindowId,
    #[serde(default)]
    pub focused: bool,
}

/// Point-in-time copy of every open tab, in host-reported order.
///
/// A snapshot is never patched in place: the store swaps in a whole new one
/// on every reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Snapshot {
    pub tabs: Vec<TabRecord>,
    pub window_count: usize,
    pub generation: u64,
}

impl Snapshot {
    /// Wraps a tab list with no window information, e.g. for pure derivations.
    pub fn from_tabs(tabs: Vec<TabRecord>) -> Self {
        Self {
            tabs,
            window_count: 0,
            generation: 0,
        }
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabRecord> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

/// Tab and window counters shown alongside the tab list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SnapshotStats {
    pub tab_count: usize,
    pub window_count: usize,
}

/// Display projection of a tab: the host of its URL, or the raw URL when it has none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabRow {
    pub id: TabId,
    pub title: String,
    pub host_label: String,
    pub fav_icon_url: Option<String>,
    pub active: bool,
}

/// Filter accepted by `TabSource::query_tabs`. The default matches every tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabQuery {
    pub active: Option<bool>,
    pub current_window: bool,
}

impl TabQuery {
    /// Matches the focused tab of the focused window.
    pub fn current_tab() -> Self {
        Self {
            active: Some(true),
            current_window: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabUpdate {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowUpdate {
    pub focused: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    pub title: Option<String>,
    pub collapsed: Option<bool>,
}

/// Change notification pushed by the tab source. Carries no payload guarantees
/// beyond "something changed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created(TabId),
    Removed(TabId),
    Updated(TabId),
}
