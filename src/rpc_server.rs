//! TabKeeper RPC Server: JSON-RPC over stdin/stdout for a presentation layer.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"tabs.search", "params":{"query":"rust"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! The tab source is the in-memory registry, seeded from the JSON array of tab
//! records at `$TABKEEPER_SEED` when set. Logs go to stderr.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use tabkeeper::app::App;
use tabkeeper::rpc_handler::handle_method;
use tabkeeper::services::settings_engine::SettingsEngine;
use tabkeeper::source::memory::InMemoryTabSource;
use tabkeeper::types::tab::TabRecord;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_seed() -> Vec<TabRecord> {
    let Ok(path) = std::env::var("TABKEEPER_SEED") else {
        return Vec::new();
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path, error = %e, "seed file is not a tab list, starting empty");
            Vec::new()
        }),
        Err(e) => {
            warn!(path = %path, error = %e, "cannot read seed file, starting empty");
            Vec::new()
        }
    }
}

async fn write_line(stdout: &mut io::Stdout, value: &Value) -> std::io::Result<()> {
    stdout.write_all(format!("{}\n", value).as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    init_logging();

    let source = Arc::new(InMemoryTabSource::from_records(load_seed()));
    let app = App::new(source, SettingsEngine::new(None));
    let _watcher = match app.start().await {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!(error = %e, "initial reconciliation failed");
            None
        }
    };

    let mut stdout = io::stdout();
    write_line(
        &mut stdout,
        &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}),
    )
    .await?;

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let err = json!({"id": null, "error": format!("parse error: {}", e)});
                write_line(&mut stdout, &err).await?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        write_line(&mut stdout, &response).await?;
    }

    Ok(())
}
