//! RPC method handler for the Shellmarks JSON-RPC protocol.
//!
//! Shared by `rpc_server.rs` and the unit tests. `handle_method` dispatches
//! each call to the bookmark manager held by [`App`].

use serde_json::{json, Value};
use tracing::warn;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{BookmarkChild, BookmarkId};

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing {}", name))
}

fn opt_str_param<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

fn id_param(params: &Value, name: &str) -> Result<BookmarkId, String> {
    str_param(params, name)?
        .parse()
        .map_err(|e| format!("invalid {}: {}", name, e))
}

fn opt_id_param(params: &Value, name: &str) -> Result<Option<BookmarkId>, String> {
    match opt_str_param(params, name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| format!("invalid {}: {}", name, e)),
        None => Ok(None),
    }
}

fn position_param(params: &Value) -> Option<usize> {
    params
        .get("position")
        .and_then(Value::as_u64)
        .and_then(|p| usize::try_from(p).ok())
}

/// Autosaves after a mutation that has already been applied in memory and
/// reports the outcome in the result under `saved`.
///
/// A failed save adds `save_error` instead of failing the call, so the
/// client still learns ids of nodes that now exist.
fn with_save_status(app: &mut App, mut result: Value) -> Value {
    let (saved, error) = match app.autosave() {
        Ok(saved) => (saved, None),
        Err(e) => {
            warn!(error = %e, "autosave failed, change kept in memory only");
            (false, Some(e.to_string()))
        }
    };
    if let Some(fields) = result.as_object_mut() {
        fields.insert("saved".to_string(), json!(saved));
        if let Some(error) = error {
            fields.insert("save_error".to_string(), json!(error));
        }
    }
    result
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// Mutating methods autosave afterwards, see [`with_save_status`].
pub fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Tree ───
        "tree.get" => match opt_id_param(params, "id")? {
            Some(id) => {
                let folder = app
                    .bookmarks
                    .get_folder(&id)
                    .ok_or_else(|| format!("Bookmark folder not found: {}", id))?;
                serde_json::to_value(folder).map_err(|e| e.to_string())
            }
            None => serde_json::to_value(app.bookmarks.root()).map_err(|e| e.to_string()),
        },
        "tree.save" => {
            app.bookmarks.save().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tree.load" => {
            app.bookmarks.load().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "children": app.bookmarks.root().len()}))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let parent = opt_id_param(params, "parent_id")?;
            let name = str_param(params, "name")?;
            let location = str_param(params, "location")?;
            let description = opt_str_param(params, "description").unwrap_or("");
            let id = app
                .bookmarks
                .add_bookmark(parent.as_ref(), name, location, description, position_param(params))
                .map_err(|e| e.to_string())?;
            let result = json!({"id": id.to_string(), "name": name, "location": location});
            Ok(with_save_status(app, result))
        }
        "bookmark.update" => {
            let id = id_param(params, "id")?;
            app.bookmarks
                .update_bookmark(
                    &id,
                    opt_str_param(params, "location"),
                    opt_str_param(params, "description"),
                )
                .map_err(|e| e.to_string())?;
            Ok(with_save_status(app, json!({"ok": true})))
        }
        "bookmark.visit" => {
            let id = id_param(params, "id")?;
            app.bookmarks.record_visit(&id).map_err(|e| e.to_string())?;
            let item = app
                .bookmarks
                .get_item(&id)
                .ok_or_else(|| format!("Bookmark not found: {}", id))?;
            let result = serde_json::to_value(item).map_err(|e| e.to_string())?;
            Ok(with_save_status(app, result))
        }
        "bookmark.search" => {
            let query = str_param(params, "query")?;
            serde_json::to_value(app.bookmarks.search(query)).map_err(|e| e.to_string())
        }

        // ─── Folders and shared node operations ───
        "folder.create" => {
            let parent = opt_id_param(params, "parent_id")?;
            let name = str_param(params, "name")?;
            let id = app
                .bookmarks
                .create_folder(parent.as_ref(), name, position_param(params))
                .map_err(|e| e.to_string())?;
            Ok(with_save_status(app, json!({"id": id.to_string(), "name": name})))
        }
        "node.rename" => {
            let id = id_param(params, "id")?;
            let name = str_param(params, "name")?;
            app.bookmarks.rename(&id, name).map_err(|e| e.to_string())?;
            Ok(with_save_status(app, json!({"ok": true})))
        }
        "node.remove" => {
            let id = id_param(params, "id")?;
            let removed = app.bookmarks.remove(&id).map_err(|e| e.to_string())?;
            let kind = match removed {
                BookmarkChild::Folder(_) => "folder",
                BookmarkChild::Item(_) => "item",
            };
            Ok(with_save_status(app, json!({"ok": true, "kind": kind})))
        }

        // ─── Events / settings ───
        "events.drain" => serde_json::to_value(app.event_log.drain()).map_err(|e| e.to_string()),
        "settings.get" => {
            serde_json::to_value(app.settings_engine.get_settings()).map_err(|e| e.to_string())
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
