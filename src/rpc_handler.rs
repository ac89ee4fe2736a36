//! RPC method handler for the LinkStash JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! bookmark service held by the `App` struct.

use std::path::Path;
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::types::bookmark::{Bookmark, BookmarkPatch, Category, Platform};

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn to_json(bookmark: &Bookmark) -> Result<Value, String> {
    serde_json::to_value(bookmark).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Bookmarks ───
        "bookmark.add" => {
            let url = str_param(params, "url")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a.add_bookmark(url).map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.list" => {
            let category = match params.get("category").and_then(|v| v.as_str()) {
                Some(c) => c.parse::<Category>()?,
                None => Category::All,
            };
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            let a = app.lock().map_err(|e| e.to_string())?;
            let items = a
                .service
                .filter(category, query)
                .into_iter()
                .map(to_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(json!({"total": items.len(), "items": items}))
        }
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a.service.get(id).map_err(|e| e.to_string())?;
            to_json(bookmark)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let patch: BookmarkPatch = serde_json::from_value(params.get("patch").cloned().unwrap_or(json!({})))
                .map_err(|e| format!("invalid patch: {}", e))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let updated = a.service.update_bookmark(id, patch).map_err(|e| e.to_string())?;
            Ok(json!({"updated": updated}))
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.service.delete_bookmark(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.toggle_favorite" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let updated = a.service.toggle_favorite(id).map_err(|e| e.to_string())?;
            let favorite = a.service.find(id).map(|b| b.favorite);
            Ok(json!({"updated": updated, "favorite": favorite}))
        }
        "bookmark.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.service.clear_all().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.counts" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut counts = serde_json::Map::new();
            counts.insert("all".into(), json!(a.service.category_count(Category::All)));
            counts.insert("favorites".into(), json!(a.service.category_count(Category::Favorites)));
            for platform in Platform::ALL {
                counts.insert(
                    platform.as_str().into(),
                    json!(a.service.category_count(Category::Platform(platform))),
                );
            }
            Ok(Value::Object(counts))
        }

        // ─── Tags ───
        "tag.add" => {
            let id = str_param(params, "id")?;
            let tag = str_param(params, "tag")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let added = a.service.add_tag(id, tag).map_err(|e| e.to_string())?;
            Ok(json!({"updated": added}))
        }
        "tag.remove" => {
            let id = str_param(params, "id")?;
            let tag = str_param(params, "tag")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let updated = a.service.remove_tag(id, tag).map_err(|e| e.to_string())?;
            Ok(json!({"updated": updated}))
        }

        // ─── Import / Export ───
        "data.export" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let data = a.service.export_data().map_err(|e| e.to_string())?;
            Ok(json!({"data": data}))
        }
        "data.export_file" => {
            let dir = str_param(params, "dir")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let today = chrono::Local::now().date_naive();
            let path = a
                .service
                .export_to_dir(Path::new(dir), today)
                .map_err(|e| e.to_string())?;
            Ok(json!({"path": path.to_string_lossy()}))
        }
        "data.import" => {
            let data = str_param(params, "data")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a.service.import_data(data).map_err(|e| e.to_string())?;
            serde_json::to_value(outcome).map_err(|e| e.to_string())
        }
        "data.import_file" => {
            let path = str_param(params, "path")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a
                .service
                .import_from_file(Path::new(path))
                .map_err(|e| e.to_string())?;
            serde_json::to_value(outcome).map_err(|e| e.to_string())
        }
        "data.import_stats" => {
            let data = str_param(params, "data")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let stats = a.service.store().import_stats(data);
            serde_json::to_value(stats).map_err(|e| e.to_string())
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
