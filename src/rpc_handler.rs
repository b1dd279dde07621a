//! RPC method handler for the TabKeeper JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. `handle_method`
//! maps a method name and its params onto an `Intent` and renders the outcome.

use serde_json::{json, Value};

use crate::app::{App, Intent, IntentOutcome};
use crate::services::tab_derivation;
use crate::types::actions::GroupOutcome;
use crate::types::tab::TabId;

fn tab_id_param(params: &Value) -> Result<TabId, String> {
    params
        .get("id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| "missing id".to_string())
}

fn render_groups(outcomes: &[GroupOutcome]) -> Value {
    let items: Vec<Value> = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(group_id) => json!({"domain": o.domain, "tab_ids": o.tab_ids, "group_id": group_id}),
            Err(e) => json!({"domain": o.domain, "tab_ids": o.tab_ids, "error": e.to_string()}),
        })
        .collect();
    json!({ "groups": items })
}

fn render(outcome: IntentOutcome) -> Result<Value, String> {
    match outcome {
        IntentOutcome::Tabs(tabs) => {
            let rows = tab_derivation::tab_rows(&tabs);
            Ok(json!({ "items": rows }))
        }
        IntentOutcome::Stats(stats) => serde_json::to_value(stats).map_err(|e| e.to_string()),
        IntentOutcome::Grouped(outcomes) => Ok(render_groups(&outcomes)),
        IntentOutcome::Batch(report) => {
            serde_json::to_value(report.summary()).map_err(|e| e.to_string())
        }
        IntentOutcome::Done => Ok(json!({"ok": true})),
    }
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    let intent = match method {
        "ping" => return Ok(json!({"pong": true})),

        // ─── Tabs ───
        "tabs.list" => Intent::ListTabs,
        "tabs.search" => {
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            Intent::Search(query.to_string())
        }
        "tabs.stats" => Intent::Stats,
        "tabs.refresh" => Intent::Refresh,
        "tabs.group_by_domain" => Intent::GroupByDomain,
        "tabs.close_duplicates" => Intent::CloseDuplicates,
        "tabs.close_others" => Intent::CloseOthers,
        "tabs.suspend_inactive" => Intent::SuspendInactive,
        "tabs.activate" => Intent::Activate(tab_id_param(params)?),
        "tabs.close" => Intent::Close(tab_id_param(params)?),

        // ─── Settings ───
        "settings.get" => {
            return serde_json::to_value(app.settings()).map_err(|e| e.to_string());
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.update_setting(key, value).map_err(|e| e.to_string())?;
            return Ok(json!({"ok": true}));
        }

        _ => return Err(format!("unknown method: {}", method)),
    };

    let outcome = app.dispatch(intent).await.map_err(|e| e.to_string())?;
    render(outcome)
}
