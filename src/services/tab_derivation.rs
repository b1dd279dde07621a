// TabKeeper derivation engine
// Pure functions over a Snapshot: search, domain grouping, duplicate detection,
// scope exclusion and suspension candidates. None of them fail on malformed
// tab data; records that cannot be interpreted are simply left out.

use std::collections::{BTreeMap, HashSet};

use url::Url;

use crate::types::tab::{Snapshot, SnapshotStats, TabId, TabRecord, TabRow, WindowId};

/// Domain name -> member tab ids (snapshot order). Only shared domains appear.
pub type DomainGroupPlan = BTreeMap<String, Vec<TabId>>;

/// Tabs whose URL already appeared earlier in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSet {
    ids: Vec<TabId>,
}

impl DuplicateSet {
    pub fn ids(&self) -> &[TabId] {
        &self.ids
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.ids.contains(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn into_ids(self) -> Vec<TabId> {
        self.ids
    }
}

/// Returns the host of `url`, or `None` when it does not parse as an absolute URL.
///
/// URLs that parse without a host (`about:blank`, `file:///...`) yield an empty domain.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    Some(parsed.host_str().unwrap_or("").to_string())
}

/// Case-insensitive substring match against title or URL.
pub fn tab_matches(tab: &TabRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    tab.title.to_lowercase().contains(&needle) || tab.url.to_lowercase().contains(&needle)
}

/// Tabs matching `query`, in snapshot order. An empty query keeps everything.
pub fn filter_tabs(snapshot: &Snapshot, query: &str) -> Vec<TabRecord> {
    snapshot
        .tabs
        .iter()
        .filter(|t| tab_matches(t, query))
        .cloned()
        .collect()
}

/// Clusters tabs by URL host. Unparseable URLs and single-tab domains are dropped.
/// Hostless URLs share the empty domain.
pub fn plan_groups(snapshot: &Snapshot) -> DomainGroupPlan {
    let mut domains: BTreeMap<String, Vec<TabId>> = BTreeMap::new();
    for tab in &snapshot.tabs {
        if let Some(domain) = extract_domain(&tab.url) {
            domains.entry(domain).or_default().push(tab.id);
        }
    }
    domains.retain(|_, ids| ids.len() >= 2);
    domains
}

/// Marks every tab whose exact URL string was already seen earlier in the snapshot.
pub fn find_duplicates(snapshot: &Snapshot) -> DuplicateSet {
    let mut seen: HashSet<&str> = HashSet::new();
    let ids = snapshot
        .tabs
        .iter()
        .filter(|t| !seen.insert(t.url.as_str()))
        .map(|t| t.id)
        .collect();
    DuplicateSet { ids }
}

/// Tabs in `current_window_id` other than `current_tab_id`.
pub fn others_in_window(
    snapshot: &Snapshot,
    current_tab_id: TabId,
    current_window_id: WindowId,
) -> Vec<TabId> {
    snapshot
        .tabs
        .iter()
        .filter(|t| t.window_id == current_window_id && t.id != current_tab_id)
        .map(|t| t.id)
        .collect()
}

/// Whether a tab may be discarded: not focused, not playing sound, not already discarded.
pub fn is_suspendable(tab: &TabRecord) -> bool {
    !tab.active && !tab.audible && !tab.discarded
}

/// Up to `limit` suspendable tabs, in snapshot order.
pub fn suspension_candidates(snapshot: &Snapshot, limit: usize) -> Vec<TabId> {
    snapshot
        .tabs
        .iter()
        .filter(|t| is_suspendable(t))
        .map(|t| t.id)
        .take(limit)
        .collect()
}

/// Label shown under a tab title: the URL host, or the raw URL when there is none.
pub fn host_label(url: &str) -> String {
    extract_domain(url)
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| url.to_string())
}

pub fn tab_rows(tabs: &[TabRecord]) -> Vec<TabRow> {
    tabs.iter()
        .map(|t| TabRow {
            id: t.id,
            title: t.title.clone(),
            host_label: host_label(&t.url),
            fav_icon_url: t.fav_icon_url.clone(),
            active: t.active,
        })
        .collect()
}

pub fn stats(snapshot: &Snapshot) -> SnapshotStats {
    SnapshotStats {
        tab_count: snapshot.tabs.len(),
        window_count: snapshot.window_count,
    }
}
