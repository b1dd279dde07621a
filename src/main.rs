//! TabKeeper console demo.
//!
//! Seeds an in-memory tab registry, then runs every bulk operation against it
//! and prints the reconciled state after each step.

use std::sync::Arc;

use tabkeeper::app::{App, Intent, IntentOutcome};
use tabkeeper::services::settings_engine::SettingsEngine;
use tabkeeper::services::tab_derivation;
use tabkeeper::source::memory::InMemoryTabSource;
use tabkeeper::source::TabSource;
use tracing_subscriber::EnvFilter;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn print_tabs(app: &App) {
    let snapshot = app.store().snapshot();
    for row in tab_derivation::tab_rows(&snapshot.tabs) {
        let marker = if row.active { "*" } else { " " };
        println!("  {} [{}] {} ({})", marker, row.id, row.title, row.host_label);
    }
    let stats = app.store().stats();
    println!("  {} tabs in {} windows", stats.tab_count, stats.window_count);
    println!();
}

fn seed(source: &InMemoryTabSource) -> Result<(), Box<dyn std::error::Error>> {
    let main = source.open_window();
    let side = source.open_window();
    source.open_tab(main, "https://github.com/rust-lang/rust", "rust-lang/rust")?;
    source.open_tab(main, "https://docs.rs/tokio", "tokio - Rust")?;
    source.open_tab(main, "https://github.com/tokio-rs/tokio", "tokio-rs/tokio")?;
    source.open_tab(main, "https://docs.rs/tokio", "tokio - Rust")?;
    let radio = source.open_tab(main, "https://radio.example.org/live", "Live radio")?;
    source.set_audible(radio, true)?;
    source.open_tab(main, "about:blank", "New Tab")?;
    source.open_tab(side, "https://crates.io", "crates.io")?;
    source.open_tab(side, "https://github.com/serde-rs/serde", "serde-rs/serde")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let source = Arc::new(InMemoryTabSource::new());
    seed(&source)?;

    let settings_path = std::env::temp_dir().join("tabkeeper_demo_settings.json");
    let app = App::new(
        source.clone(),
        SettingsEngine::new(Some(settings_path.to_string_lossy().to_string())),
    );
    let watcher = app.start().await?;

    section("Initial snapshot");
    print_tabs(&app);

    section("Search \"tokio\"");
    if let IntentOutcome::Tabs(tabs) = app.dispatch(Intent::Search("tokio".to_string())).await? {
        for row in tab_derivation::tab_rows(&tabs) {
            println!("  [{}] {}", row.id, row.title);
        }
    }
    println!();

    section("Close duplicates");
    if let IntentOutcome::Batch(report) = app.dispatch(Intent::CloseDuplicates).await? {
        println!("  closed {:?}", report.succeeded);
    }
    print_tabs(&app);

    section("Group by domain");
    if let IntentOutcome::Grouped(groups) = app.dispatch(Intent::GroupByDomain).await? {
        for group in groups {
            println!("  {} -> {:?}", group.domain, group.tab_ids);
        }
    }
    println!();

    section("Suspend inactive");
    if let IntentOutcome::Batch(report) = app.dispatch(Intent::SuspendInactive).await? {
        println!("  discarded {:?}", report.succeeded);
    }
    println!();

    section("Close others");
    let current = app.actions().resolve_current_tab().await?;
    println!("  keeping [{}] {}", current.id, current.title);
    app.dispatch(Intent::CloseOthers).await?;
    print_tabs(&app);

    let remaining = source.query_tabs(&Default::default()).await?;
    println!("  source reports {} tabs", remaining.len());

    watcher.abort();
    let _ = std::fs::remove_file(settings_path);
    Ok(())
}
