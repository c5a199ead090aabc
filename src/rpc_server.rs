//! Shellmarks RPC Server: JSON-RPC over stdin/stdout for the shell UI.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"name":"...","location":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! `SHELLMARKS_CONFIG` overrides the settings file path; `SHELLMARKS_LOG`
//! overrides the log filter.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{error, info, warn};

use shellmarks::app::App;
use shellmarks::logging;
use shellmarks::rpc_handler::handle_method;
use shellmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

fn respond(out: &mut impl Write, response: &Value) {
    if writeln!(out, "{}", response).and_then(|_| out.flush()).is_err() {
        error!("failed to write RPC response");
    }
}

fn main() {
    let mut settings_engine = SettingsEngine::new(std::env::var("SHELLMARKS_CONFIG").ok());
    let settings_result = settings_engine.load();
    logging::init(&settings_engine.get_settings().logging.filter);
    if let Err(e) = settings_result {
        warn!(error = %e, "falling back to default settings");
    }

    let mut app = match App::from_settings(settings_engine) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize shellmarks");
            std::process::exit(1);
        }
    };
    info!(version = env!("CARGO_PKG_VERSION"), "shellmarks rpc ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    respond(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                respond(&mut out, &json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&mut app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                warn!(method, error = %err, "rpc call failed");
                json!({"id": id, "error": err})
            }
        };
        respond(&mut out, &response);
    }

    if let Err(e) = app.autosave() {
        error!(error = %e, "final save failed");
    }
}
