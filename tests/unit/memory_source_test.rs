use tabkeeper::source::memory::InMemoryTabSource;
use tabkeeper::source::TabSource;
use tabkeeper::types::errors::TabError;
use tabkeeper::types::tab::{GroupUpdate, TabEvent, TabQuery, TabRecord, TabUpdate, WindowUpdate};

fn two_windows() -> (InMemoryTabSource, i64, i64) {
    let source = InMemoryTabSource::new();
    let w1 = source.open_window();
    let w2 = source.open_window();
    (source, w1, w2)
}

#[tokio::test]
async fn test_first_tab_in_window_becomes_active() {
    let (source, w1, _) = two_windows();
    let t1 = source.open_tab(w1, "https://a.com", "A").unwrap();
    let t2 = source.open_tab(w1, "https://b.com", "B").unwrap();

    assert!(source.get_tab(t1).unwrap().active);
    assert!(!source.get_tab(t2).unwrap().active);
}

#[tokio::test]
async fn test_open_tab_in_unknown_window_fails() {
    let source = InMemoryTabSource::new();
    assert_eq!(
        source.open_tab(99, "https://a.com", "A"),
        Err(TabError::WindowNotFound(99))
    );
}

#[tokio::test]
async fn test_query_current_tab_uses_focused_window() {
    let (source, w1, w2) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    let b = source.open_tab(w2, "https://b.com", "B").unwrap();

    let current = source.query_tabs(&TabQuery::current_tab()).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, a);

    source
        .update_window(w2, WindowUpdate { focused: Some(true) })
        .await
        .unwrap();
    let current = source.query_tabs(&TabQuery::current_tab()).await.unwrap();
    assert_eq!(current[0].id, b);
}

#[tokio::test]
async fn test_update_tab_active_is_exclusive_per_window() {
    let (source, w1, _) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    let b = source.open_tab(w1, "https://b.com", "B").unwrap();

    let updated = source
        .update_tab(b, TabUpdate { active: Some(true) })
        .await
        .unwrap();
    assert!(updated.active);
    assert!(!source.get_tab(a).unwrap().active);
}

#[tokio::test]
async fn test_update_missing_tab_is_not_found() {
    let source = InMemoryTabSource::new();
    let result = source.update_tab(5, TabUpdate { active: Some(true) }).await;
    assert_eq!(result, Err(TabError::NotFound(5)));
}

#[tokio::test]
async fn test_remove_active_tab_activates_neighbour() {
    let (source, w1, _) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    let b = source.open_tab(w1, "https://b.com", "B").unwrap();
    let c = source.open_tab(w1, "https://c.com", "C").unwrap();
    source.update_tab(b, TabUpdate { active: Some(true) }).await.unwrap();

    source.remove_tab(b).await.unwrap();
    assert!(source.get_tab(c).unwrap().active);
    assert!(!source.get_tab(a).unwrap().active);

    source.remove_tab(c).await.unwrap();
    assert!(source.get_tab(a).unwrap().active);
}

#[tokio::test]
async fn test_removing_last_tab_closes_window() {
    let (source, w1, w2) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    source.open_tab(w2, "https://b.com", "B").unwrap();

    source.remove_tab(a).await.unwrap();
    let windows = source.query_windows().await.unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].id, w2);
    assert!(windows[0].focused);
}

#[tokio::test]
async fn test_remove_tabs_is_best_effort() {
    let (source, w1, _) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    let b = source.open_tab(w1, "https://b.com", "B").unwrap();
    source.open_tab(w1, "https://c.com", "C").unwrap();

    let report = source.remove_tabs(&[a, 404, b]).await;
    assert_eq!(report.succeeded, vec![a, b]);
    assert_eq!(report.failed, vec![(404, TabError::NotFound(404))]);
    assert_eq!(source.tab_count(), 1);
}

#[tokio::test]
async fn test_group_and_label() {
    let (source, w1, _) = two_windows();
    let a = source.open_tab(w1, "https://a.com/1", "A1").unwrap();
    let b = source.open_tab(w1, "https://a.com/2", "A2").unwrap();

    let group_id = source.group_tabs(&[a, b]).await.unwrap();
    source
        .update_group(
            group_id,
            GroupUpdate {
                title: Some("a.com".to_string()),
                collapsed: Some(false),
            },
        )
        .await
        .unwrap();

    let group = source.group(group_id).unwrap();
    assert_eq!(group.title, "a.com");
    assert!(!group.collapsed);
    assert_eq!(source.get_tab(a).unwrap().group_id, Some(group_id));
}

#[tokio::test]
async fn test_group_with_missing_tab_changes_nothing() {
    let (source, w1, _) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();

    assert_eq!(source.group_tabs(&[a, 77]).await, Err(TabError::NotFound(77)));
    assert!(source.groups().is_empty());
    assert_eq!(source.get_tab(a).unwrap().group_id, None);
}

#[tokio::test]
async fn test_regrouping_drops_emptied_group() {
    let (source, w1, _) = two_windows();
    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    let b = source.open_tab(w1, "https://b.com", "B").unwrap();

    let first = source.group_tabs(&[a, b]).await.unwrap();
    let second = source.group_tabs(&[a, b]).await.unwrap();
    assert!(source.group(first).is_none());
    assert!(source.group(second).is_some());
    assert_eq!(
        source.update_group(first, GroupUpdate::default()).await,
        Err(TabError::GroupNotFound(first))
    );
}

#[tokio::test]
async fn test_discard_rules() {
    let (source, w1, _) = two_windows();
    let active = source.open_tab(w1, "https://a.com", "A").unwrap();
    let idle = source.open_tab(w1, "https://b.com", "B").unwrap();

    assert!(matches!(
        source.discard_tab(active).await,
        Err(TabError::Ineligible(id, _)) if id == active
    ));

    source.discard_tab(idle).await.unwrap();
    assert!(source.get_tab(idle).unwrap().discarded);
    assert!(matches!(
        source.discard_tab(idle).await,
        Err(TabError::Ineligible(_, _))
    ));

    // Activating reloads it.
    source.update_tab(idle, TabUpdate { active: Some(true) }).await.unwrap();
    assert!(!source.get_tab(idle).unwrap().discarded);
}

#[tokio::test]
async fn test_mutations_emit_events() {
    let (source, w1, _) = two_windows();
    let mut events = source.subscribe();

    let a = source.open_tab(w1, "https://a.com", "A").unwrap();
    source.set_title(a, "Renamed").unwrap();
    source.remove_tab(a).await.unwrap();

    assert_eq!(events.recv().await.unwrap(), TabEvent::Created(a));
    assert_eq!(events.recv().await.unwrap(), TabEvent::Updated(a));
    assert_eq!(events.recv().await.unwrap(), TabEvent::Removed(a));
}

#[tokio::test]
async fn test_from_records_accepts_host_json() {
    let json = r#"[
        {"id": 4, "windowId": 2, "url": "https://a.com", "title": "A", "active": true, "audible": false},
        {"id": 9, "windowId": 2, "url": "not a url", "favIconUrl": "https://a.com/favicon.ico"}
    ]"#;
    let records: Vec<TabRecord> = serde_json::from_str(json).unwrap();
    let source = InMemoryTabSource::from_records(records);

    let tabs = source.query_tabs(&TabQuery::default()).await.unwrap();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[1].title, "");
    assert_eq!(tabs[1].fav_icon_url.as_deref(), Some("https://a.com/favicon.ico"));

    let w = source.open_window();
    assert_eq!(w, 3);
    let t = source.open_tab(w, "https://b.com", "B").unwrap();
    assert_eq!(t, 10);
}
