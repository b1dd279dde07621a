//! In-memory tab source.
//!
//! Models a host registry with windows, tabs and tab groups. Every mutation
//! emits a `TabEvent`. Used by the RPC binary and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::source::TabSource;
use crate::types::errors::TabError;
use crate::types::tab::{
    GroupId, GroupUpdate, TabEvent, TabId, TabQuery, TabRecord, TabUpdate, WindowId,
    WindowRecord, WindowUpdate,
};

const EVENT_CAPACITY: usize = 256;

/// A tab group as held by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct TabGroup {
    pub id: GroupId,
    pub title: String,
    pub collapsed: bool,
}

struct MemoryState {
    windows: Vec<WindowRecord>,
    tabs: Vec<TabRecord>,
    groups: HashMap<GroupId, TabGroup>,
    next_tab_id: TabId,
    next_window_id: WindowId,
    next_group_id: GroupId,
}

impl MemoryState {
    fn focused_window(&self) -> Option<WindowId> {
        self.windows.iter().find(|w| w.focused).map(|w| w.id)
    }

    fn tab_index(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    /// Drops groups that no longer have members.
    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        self.groups
            .retain(|id, _| tabs.iter().any(|t| t.group_id == Some(*id)));
    }
}

/// In-memory implementation of `TabSource`.
pub struct InMemoryTabSource {
    state: Mutex<MemoryState>,
    events: broadcast::Sender<TabEvent>,
    unavailable: AtomicBool,
    query_delay_ms: AtomicUsize,
    query_count: AtomicUsize,
}

impl InMemoryTabSource {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(MemoryState {
                windows: Vec::new(),
                tabs: Vec::new(),
                groups: HashMap::new(),
                next_tab_id: 1,
                next_window_id: 1,
                next_group_id: 1,
            }),
            events,
            unavailable: AtomicBool::new(false),
            query_delay_ms: AtomicUsize::new(0),
            query_count: AtomicUsize::new(0),
        }
    }

    /// Seeds the registry from host-shaped records.
    ///
    /// Windows are created for every distinct `window_id` in first-seen order;
    /// the first one is focused. Extra `active` flags in a window are cleared so
    /// that at most one tab per window stays active.
    pub fn from_records(records: Vec<TabRecord>) -> Self {
        let source = Self::new();
        {
            let mut state = source.state();
            for mut record in records {
                if !state.windows.iter().any(|w| w.id == record.window_id) {
                    let focused = state.windows.is_empty();
                    state.windows.push(WindowRecord {
                        id: record.window_id,
                        focused,
                    });
                }
                if record.active
                    && state
                        .tabs
                        .iter()
                        .any(|t| t.window_id == record.window_id && t.active)
                {
                    record.active = false;
                }
                state.next_tab_id = state.next_tab_id.max(record.id + 1);
                state.next_window_id = state.next_window_id.max(record.window_id + 1);
                state.tabs.push(record);
            }
        }
        source
    }

    /// Current record for `tab_id`.
    pub fn get_tab(&self, tab_id: TabId) -> Result<TabRecord, TabError> {
        self.state()
            .tabs
            .iter()
            .find(|t| t.id == tab_id)
            .cloned()
            .ok_or(TabError::NotFound(tab_id))
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: TabEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    async fn before_query(&self) -> Result<(), TabError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        let delay = self.query_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TabError::Source("tab source unavailable".to_string()));
        }
        Ok(())
    }

    /// Opens a new window. The first window opened gets focus.
    pub fn open_window(&self) -> WindowId {
        let mut state = self.state();
        let id = state.next_window_id;
        state.next_window_id += 1;
        let focused = state.focused_window().is_none();
        state.windows.push(WindowRecord { id, focused });
        id
    }

    /// Opens a tab at the end of `window_id`. It becomes active when the window has none.
    pub fn open_tab(&self, window_id: WindowId, url: &str, title: &str) -> Result<TabId, TabError> {
        let id = {
            let mut state = self.state();
            if !state.windows.iter().any(|w| w.id == window_id) {
                return Err(TabError::WindowNotFound(window_id));
            }
            let id = state.next_tab_id;
            state.next_tab_id += 1;
            let mut record = TabRecord::new(id, window_id, url);
            record.title = title.to_string();
            record.active = !state
                .tabs
                .iter()
                .any(|t| t.window_id == window_id && t.active);
            state.tabs.push(record);
            id
        };
        self.emit(TabEvent::Created(id));
        Ok(id)
    }

    pub fn set_audible(&self, tab_id: TabId, audible: bool) -> Result<(), TabError> {
        self.modify(tab_id, |t| t.audible = audible)
    }

    pub fn set_title(&self, tab_id: TabId, title: &str) -> Result<(), TabError> {
        self.modify(tab_id, |t| t.title = title.to_string())
    }

    fn modify(&self, tab_id: TabId, f: impl FnOnce(&mut TabRecord)) -> Result<(), TabError> {
        {
            let mut state = self.state();
            let idx = state.tab_index(tab_id).ok_or(TabError::NotFound(tab_id))?;
            f(&mut state.tabs[idx]);
        }
        self.emit(TabEvent::Updated(tab_id));
        Ok(())
    }

    /// Makes every query fail with `TabError::Source` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every query, to widen the window for overlapping refreshes.
    pub fn set_query_delay(&self, delay: Duration) {
        self.query_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    /// Number of `query_tabs` calls served so far.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn group(&self, group_id: GroupId) -> Option<TabGroup> {
        self.state().groups.get(&group_id).cloned()
    }

    pub fn groups(&self) -> Vec<TabGroup> {
        let mut groups: Vec<TabGroup> = self.state().groups.values().cloned().collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    pub fn tab_count(&self) -> usize {
        self.state().tabs.len()
    }
}

impl Default for InMemoryTabSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TabSource for InMemoryTabSource {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabRecord>, TabError> {
        self.before_query().await?;
        let state = self.state();
        let focused = state.focused_window();
        Ok(state
            .tabs
            .iter()
            .filter(|t| query.active.map_or(true, |a| t.active == a))
            .filter(|t| !query.current_window || Some(t.window_id) == focused)
            .cloned()
            .collect())
    }

    async fn query_windows(&self) -> Result<Vec<WindowRecord>, TabError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TabError::Source("tab source unavailable".to_string()));
        }
        Ok(self.state().windows.clone())
    }

    /// Activating a tab deactivates its siblings and reloads it if discarded.
    async fn update_tab(&self, tab_id: TabId, update: TabUpdate) -> Result<TabRecord, TabError> {
        let record = {
            let mut state = self.state();
            let idx = state.tab_index(tab_id).ok_or(TabError::NotFound(tab_id))?;
            if update.active == Some(true) {
                let window_id = state.tabs[idx].window_id;
                for tab in state.tabs.iter_mut().filter(|t| t.window_id == window_id) {
                    tab.active = tab.id == tab_id;
                }
                state.tabs[idx].discarded = false;
            }
            state.tabs[idx].clone()
        };
        self.emit(TabEvent::Updated(tab_id));
        Ok(record)
    }

    async fn update_window(
        &self,
        window_id: WindowId,
        update: WindowUpdate,
    ) -> Result<WindowRecord, TabError> {
        let mut state = self.state();
        if !state.windows.iter().any(|w| w.id == window_id) {
            return Err(TabError::WindowNotFound(window_id));
        }
        if update.focused == Some(true) {
            for window in state.windows.iter_mut() {
                window.focused = window.id == window_id;
            }
        }
        state
            .windows
            .iter()
            .find(|w| w.id == window_id)
            .cloned()
            .ok_or(TabError::WindowNotFound(window_id))
    }

    /// Closes a tab. If it was active, the nearest neighbour in its window takes over;
    /// a window left empty is closed as well.
    async fn remove_tab(&self, tab_id: TabId) -> Result<(), TabError> {
        {
            let mut state = self.state();
            let idx = state.tab_index(tab_id).ok_or(TabError::NotFound(tab_id))?;
            let removed = state.tabs.remove(idx);
            let window_id = removed.window_id;

            let siblings: Vec<usize> = state
                .tabs
                .iter()
                .enumerate()
                .filter(|(_, t)| t.window_id == window_id)
                .map(|(i, _)| i)
                .collect();

            if siblings.is_empty() {
                let was_focused = state
                    .windows
                    .iter()
                    .any(|w| w.id == window_id && w.focused);
                state.windows.retain(|w| w.id != window_id);
                if was_focused {
                    if let Some(first) = state.windows.first_mut() {
                        first.focused = true;
                    }
                }
            } else if removed.active {
                // Prefer the tab that slid into the closed tab's slot, else the previous one.
                let next = siblings
                    .iter()
                    .copied()
                    .find(|&i| i >= idx)
                    .unwrap_or(siblings[siblings.len() - 1]);
                state.tabs[next].active = true;
            }
            state.prune_groups();
        }
        self.emit(TabEvent::Removed(tab_id));
        Ok(())
    }

    async fn group_tabs(&self, tab_ids: &[TabId]) -> Result<GroupId, TabError> {
        let group_id = {
            let mut state = self.state();
            if tab_ids.is_empty() {
                return Err(TabError::Source("no tabs to group".to_string()));
            }
            if let Some(missing) = tab_ids.iter().find(|id| state.tab_index(**id).is_none()) {
                return Err(TabError::NotFound(*missing));
            }
            let group_id = state.next_group_id;
            state.next_group_id += 1;
            for tab in state.tabs.iter_mut().filter(|t| tab_ids.contains(&t.id)) {
                tab.group_id = Some(group_id);
            }
            state.groups.insert(
                group_id,
                TabGroup {
                    id: group_id,
                    title: String::new(),
                    collapsed: false,
                },
            );
            state.prune_groups();
            group_id
        };
        for &tab_id in tab_ids {
            self.emit(TabEvent::Updated(tab_id));
        }
        Ok(group_id)
    }

    async fn update_group(&self, group_id: GroupId, update: GroupUpdate) -> Result<(), TabError> {
        let mut state = self.state();
        let group = state
            .groups
            .get_mut(&group_id)
            .ok_or(TabError::GroupNotFound(group_id))?;
        if let Some(title) = update.title {
            group.title = title;
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        Ok(())
    }

    async fn discard_tab(&self, tab_id: TabId) -> Result<(), TabError> {
        {
            let mut state = self.state();
            let idx = state.tab_index(tab_id).ok_or(TabError::NotFound(tab_id))?;
            let tab = &mut state.tabs[idx];
            if tab.active {
                return Err(TabError::Ineligible(tab_id, "tab is active".to_string()));
            }
            if tab.discarded {
                return Err(TabError::Ineligible(
                    tab_id,
                    "tab is already discarded".to_string(),
                ));
            }
            tab.discarded = true;
        }
        self.emit(TabEvent::Updated(tab_id));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.events.subscribe()
    }
}
