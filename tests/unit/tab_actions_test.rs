//! Unit tests for the Action Executor.
//!
//! Each test builds an in-memory registry, loads the initial snapshot and then
//! drives one bulk command, checking both the source and the reconciled store.

use std::sync::Arc;

use tabkeeper::managers::snapshot_store::SnapshotStore;
use tabkeeper::managers::tab_actions::TabActions;
use tabkeeper::source::memory::InMemoryTabSource;
use tabkeeper::source::TabSource;
use tabkeeper::types::errors::TabError;
use tabkeeper::types::tab::TabQuery;

struct Fixture {
    source: Arc<InMemoryTabSource>,
    store: Arc<SnapshotStore>,
    actions: TabActions,
}

async fn fixture(source: InMemoryTabSource) -> Fixture {
    let source = Arc::new(source);
    let store = Arc::new(SnapshotStore::new(source.clone()));
    store.refresh().await.unwrap();
    let actions = TabActions::new(source.clone(), store.clone());
    Fixture {
        source,
        store,
        actions,
    }
}

fn snapshot_ids(store: &SnapshotStore) -> Vec<i64> {
    store.snapshot().tabs.iter().map(|t| t.id).collect()
}

// ─── Close ───

#[tokio::test]
async fn test_close_tab_reconciles() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    let a = source.open_tab(w, "https://a.com", "A").unwrap();
    let b = source.open_tab(w, "https://b.com", "B").unwrap();
    let f = fixture(source).await;

    f.actions.close_tab(a).await.unwrap();
    assert_eq!(snapshot_ids(&f.store), vec![b]);
}

#[tokio::test]
async fn test_close_vanished_tab_reports_not_found_and_still_reconciles() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    let a = source.open_tab(w, "https://a.com", "A").unwrap();
    let f = fixture(source).await;
    let before = f.store.snapshot().generation;

    f.source.remove_tab(a).await.unwrap();
    assert_eq!(f.actions.close_tab(a).await, Err(TabError::NotFound(a)));
    assert!(f.store.snapshot().generation > before);
    assert!(f.store.snapshot().is_empty());
}

#[tokio::test]
async fn test_close_tabs_empty_list_is_noop() {
    let f = fixture(InMemoryTabSource::new()).await;
    let before = f.store.snapshot().generation;
    let report = f.actions.close_tabs(&[]).await;
    assert!(report.is_empty());
    assert_eq!(f.store.snapshot().generation, before);
}

// ─── Duplicates ───

#[tokio::test]
async fn test_close_duplicates_twice_is_noop_second_time() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    let a = source.open_tab(w, "http://a.com/x", "X").unwrap();
    let b = source.open_tab(w, "http://a.com/y", "Y").unwrap();
    let c = source.open_tab(w, "http://a.com/x", "X").unwrap();
    let d = source.open_tab(w, "http://a.com/x", "X").unwrap();
    let f = fixture(source).await;

    let first = f.actions.close_duplicates().await;
    assert_eq!(first.succeeded, vec![c, d]);
    assert!(first.failed.is_empty());
    assert_eq!(snapshot_ids(&f.store), vec![a, b]);

    let second = f.actions.close_duplicates().await;
    assert!(second.is_empty());
    assert_eq!(f.source.tab_count(), 2);
}

#[tokio::test]
async fn test_close_duplicates_continues_past_vanished_tab() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    source.open_tab(w, "https://a.com", "A").unwrap();
    let dup1 = source.open_tab(w, "https://a.com", "A").unwrap();
    let dup2 = source.open_tab(w, "https://a.com", "A").unwrap();
    let f = fixture(source).await;

    // Closed externally after the snapshot was taken.
    f.source.remove_tab(dup1).await.unwrap();

    let report = f.actions.close_duplicates().await;
    assert_eq!(report.succeeded, vec![dup2]);
    assert_eq!(report.failed, vec![(dup1, TabError::NotFound(dup1))]);
    assert_eq!(f.source.tab_count(), 1);
}

// ─── Close others ───

#[tokio::test]
async fn test_close_others_keeps_current_tab_and_other_windows() {
    let source = InMemoryTabSource::new();
    let w1 = source.open_window();
    let w2 = source.open_window();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    let b = source.open_tab(w1, "https://b.com", "B").unwrap();
    let c = source.open_tab(w2, "https://c.com", "C").unwrap();
    let d = source.open_tab(w1, "https://d.com", "D").unwrap();
    let f = fixture(source).await;

    f.actions.activate(b).await.unwrap();
    let report = f.actions.close_others().await.unwrap();

    assert_eq!(report.succeeded, vec![a, d]);
    assert_eq!(snapshot_ids(&f.store), vec![b, c]);
}

#[tokio::test]
async fn test_close_others_without_current_tab_fails_without_side_effects() {
    let f = fixture(InMemoryTabSource::new()).await;
    let before = f.store.snapshot().generation;

    let result = f.actions.close_others().await;
    assert!(matches!(result, Err(TabError::ResolutionFailure(_))));
    assert_eq!(f.store.snapshot().generation, before);
}

#[tokio::test]
async fn test_close_others_when_source_unavailable_is_resolution_failure() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    source.open_tab(w, "https://a.com", "A").unwrap();
    source.open_tab(w, "https://b.com", "B").unwrap();
    let f = fixture(source).await;

    f.source.set_unavailable(true);
    let result = f.actions.close_others().await;
    assert!(matches!(result, Err(TabError::ResolutionFailure(_))));

    f.source.set_unavailable(false);
    assert_eq!(f.source.tab_count(), 2);
}

// ─── Activate ───

#[tokio::test]
async fn test_activate_focuses_tab_and_window() {
    let source = InMemoryTabSource::new();
    let w1 = source.open_window();
    let w2 = source.open_window();
    source.open_tab(w1, "https://a.com", "A").unwrap();
    source.open_tab(w2, "https://b.com", "B").unwrap();
    let c = source.open_tab(w2, "https://c.com", "C").unwrap();
    let f = fixture(source).await;

    f.actions.activate(c).await.unwrap();

    let current = f.source.query_tabs(&TabQuery::current_tab()).await.unwrap();
    assert_eq!(current[0].id, c);
    assert!(f.store.snapshot().get(c).unwrap().active);
}

#[tokio::test]
async fn test_activate_missing_tab() {
    let f = fixture(InMemoryTabSource::new()).await;
    assert_eq!(f.actions.activate(8).await, Err(TabError::NotFound(8)));
}

// ─── Group ───

#[tokio::test]
async fn test_group_by_domain_labels_each_shared_domain() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    let a1 = source.open_tab(w, "https://a.com/1", "").unwrap();
    let b1 = source.open_tab(w, "https://b.com/1", "").unwrap();
    let a2 = source.open_tab(w, "https://a.com/2", "").unwrap();
    source.open_tab(w, "https://solo.com", "").unwrap();
    source.open_tab(w, "about:blank", "").unwrap();
    let b2 = source.open_tab(w, "https://b.com/2", "").unwrap();
    let f = fixture(source).await;

    let outcomes = f.actions.group_by_domain(false).await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].domain, "a.com");
    assert_eq!(outcomes[0].tab_ids, vec![a1, a2]);
    assert_eq!(outcomes[1].tab_ids, vec![b1, b2]);

    for outcome in &outcomes {
        let group_id = outcome.result.clone().unwrap();
        let group = f.source.group(group_id).unwrap();
        assert_eq!(group.title, outcome.domain);
        assert!(!group.collapsed);
    }

    let snapshot = f.store.snapshot();
    assert_eq!(snapshot.get(a1).unwrap().group_id, snapshot.get(a2).unwrap().group_id);
    assert!(snapshot.get(a1).unwrap().group_id.is_some());
}

#[tokio::test]
async fn test_group_by_domain_isolates_failures() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    let a1 = source.open_tab(w, "https://a.com/1", "").unwrap();
    source.open_tab(w, "https://a.com/2", "").unwrap();
    source.open_tab(w, "https://b.com/1", "").unwrap();
    source.open_tab(w, "https://b.com/2", "").unwrap();
    let f = fixture(source).await;

    f.source.remove_tab(a1).await.unwrap();
    let outcomes = f.actions.group_by_domain(true).await;

    assert_eq!(outcomes[0].result, Err(TabError::NotFound(a1)));
    let b_group = outcomes[1].result.clone().unwrap();
    assert!(f.source.group(b_group).unwrap().collapsed);
}

// ─── Suspend ───

#[tokio::test]
async fn test_suspend_inactive_makes_progress_in_batches() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    let active = source.open_tab(w, "https://home.com", "Home").unwrap();
    let music = source.open_tab(w, "https://music.com", "Music").unwrap();
    source.set_audible(music, true).unwrap();
    let idle: Vec<i64> = (0..12)
        .map(|i| source.open_tab(w, &format!("https://s{}.com", i), "").unwrap())
        .collect();
    let f = fixture(source).await;

    let first = f.actions.suspend_inactive(10).await;
    assert_eq!(first.succeeded, idle[..10].to_vec());

    let second = f.actions.suspend_inactive(10).await;
    assert_eq!(second.succeeded, idle[10..].to_vec());

    let third = f.actions.suspend_inactive(10).await;
    assert!(third.is_empty());

    let snapshot = f.store.snapshot();
    assert!(!snapshot.get(active).unwrap().discarded);
    assert!(!snapshot.get(music).unwrap().discarded);
}

#[tokio::test]
async fn test_suspend_continues_past_ineligible_tab() {
    let source = InMemoryTabSource::new();
    let w = source.open_window();
    source.open_tab(w, "https://home.com", "").unwrap();
    let x = source.open_tab(w, "https://x.com", "").unwrap();
    let y = source.open_tab(w, "https://y.com", "").unwrap();
    let f = fixture(source).await;

    // Becomes active after the snapshot was taken.
    f.source
        .update_tab(x, tabkeeper::types::tab::TabUpdate { active: Some(true) })
        .await
        .unwrap();

    let report = f.actions.suspend_inactive(10).await;
    assert_eq!(report.succeeded, vec![y]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, x);
}
