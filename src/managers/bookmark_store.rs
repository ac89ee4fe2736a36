//! Bookmark Store for LinkStash.
//!
//! Implements `BookmarkStoreTrait`: the canonical bookmark collection, persisted as
//! one JSON array under [`STORAGE_KEY`] through a [`StorageBackend`]. Every mutation
//! reads the whole collection, modifies it and writes it back in a single `set`.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::services::link_detector;
use crate::storage::StorageBackend;
use crate::types::bookmark::{Bookmark, BookmarkPatch, ImportStats, Platform};
use crate::types::errors::StorageError;

/// Key under which the serialized collection is persisted.
pub const STORAGE_KEY: &str = "bookmarks";

/// Fields an imported record must carry as non-empty strings.
const REQUIRED_FIELDS: [&str; 3] = ["id", "url", "title"];


/// Trait defining bookmark persistence operations.
pub trait BookmarkStoreTrait {
    /// Returns the stored collection, or an empty one if it is absent or malformed.
    fn get_all(&self) -> Vec<Bookmark>;
    /// Prepends `bookmark` to the collection.
    fn add(&mut self, bookmark: Bookmark) -> Result<(), StorageError>;
    /// Shallow-merges `patch` over the bookmark with `id`. Returns `false` if absent.
    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<bool, StorageError>;
    fn delete(&mut self, id: &str) -> Result<(), StorageError>;
    /// Removes the persisted key entirely.
    fn clear(&mut self) -> Result<(), StorageError>;
    /// Pretty-printed JSON array of the whole collection.
    fn export(&self) -> Result<String, StorageError>;
    /// Merges new records from a JSON array. Returns `false` if `data` is not a JSON array.
    fn import(&mut self, data: &str) -> Result<bool, StorageError>;
    /// Counts what [`BookmarkStoreTrait::import`] would do with `data`, without writing.
    fn import_stats(&self, data: &str) -> Option<ImportStats>;
}

/// The validated, de-duplicated result of reading an import payload.
struct ImportPlan {
    accepted: Vec<Bookmark>,
    stats: ImportStats,
}

/// Bookmark store over any key/value backend.
pub struct BookmarkStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> BookmarkStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Current time in epoch milliseconds.
    fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Reads the collection, propagating backend failures.
    ///
    /// Malformed data is discarded as an empty collection; it is not repaired.
    fn load(&self) -> Result<Vec<Bookmark>, StorageError> {
        let Some(stored) = self.backend.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&stored) {
            Ok(bookmarks) => Ok(bookmarks),
            Err(e) => {
                warn!("Discarding malformed bookmark data: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, bookmarks: &[Bookmark]) -> Result<(), StorageError> {
        let json = serde_json::to_string(bookmarks)?;
        self.backend.set(STORAGE_KEY, &json)
    }

    /// Validation and duplicate pass shared by `import` and `import_stats`.
    fn plan_import(existing: &[Bookmark], data: &str) -> Option<ImportPlan> {
        let candidates = match serde_json::from_str::<Value>(data) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                debug!("Import payload is not a JSON array");
                return None;
            }
            Err(e) => {
                debug!("Import payload is not valid JSON: {}", e);
                return None;
            }
        };

        let mut taken: HashSet<String> = existing.iter().map(|b| b.id.clone()).collect();
        let mut accepted = Vec::new();
        let mut total = 0;
        let mut duplicates = 0;

        for candidate in candidates {
            let Some(bookmark) = validate_candidate(candidate) else {
                continue;
            };
            total += 1;
            if taken.insert(bookmark.id.clone()) {
                accepted.push(bookmark);
            } else {
                duplicates += 1;
            }
        }

        let stats = ImportStats {
            total,
            new: accepted.len(),
            duplicates,
        };
        Some(ImportPlan { accepted, stats })
    }
}

/// Turns one imported JSON value into a bookmark, or `None` if it is not acceptable.
///
/// The record must be an object whose `id`, `url` and `title` are non-empty strings;
/// nothing else is checked. Known optional fields of the wrong type fall back to their
/// defaults (see [`coerce_optional_fields`]), a missing or unknown `platform` is derived
/// from the URL, and unknown keys pass through.
pub fn validate_candidate(candidate: Value) -> Option<Bookmark> {
    let Value::Object(mut record) = candidate else {
        return None;
    };

    let has_required = REQUIRED_FIELDS.iter().all(|field| {
        matches!(record.get(*field), Some(Value::String(s)) if !s.is_empty())
    });
    if !has_required {
        return None;
    }

    coerce_optional_fields(&mut record);
    normalize_platform(&mut record);
    match serde_json::from_value(Value::Object(record)) {
        Ok(bookmark) => Some(bookmark),
        Err(e) => {
            debug!("Skipping import record: {}", e);
            None
        }
    }
}

/// Drops or repairs optional fields whose JSON type does not fit a [`Bookmark`].
///
/// - `image`: kept only as a string.
/// - `tags`: the string entries of an array; anything else becomes no tags.
/// - `favorite`: kept only as a bool.
/// - `createdAt`: an integer, or a float with no fractional part; anything else is
///   dropped and the import stamps the current time.
/// - `rawPreview`: any non-null value.
pub fn coerce_optional_fields(record: &mut Map<String, Value>) {
    if record.get("image").is_some_and(|v| !v.is_string()) {
        record.remove("image");
    }

    if let Some(tags) = record.remove("tags") {
        if let Value::Array(items) = tags {
            let tags: Vec<Value> = items.into_iter().filter(Value::is_string).collect();
            record.insert("tags".to_string(), Value::Array(tags));
        }
    }

    if record.get("favorite").is_some_and(|v| !v.is_boolean()) {
        record.remove("favorite");
    }

    if let Some(created_at) = record.remove("createdAt") {
        if let Some(ms) = epoch_millis(&created_at) {
            record.insert("createdAt".to_string(), Value::from(ms));
        }
    }

    if record.get("rawPreview").is_some_and(Value::is_null) {
        record.remove("rawPreview");
    }
}

fn epoch_millis(value: &Value) -> Option<i64> {
    if let Some(ms) = value.as_i64() {
        return Some(ms);
    }
    let f = value.as_f64()?;
    let in_range = f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64;
    in_range.then_some(f as i64)
}

fn normalize_platform(record: &mut Map<String, Value>) {
    let known = record
        .get("platform")
        .and_then(Value::as_str)
        .is_some_and(|p| p.parse::<Platform>().is_ok());
    if known {
        return;
    }
    let url = record.get("url").and_then(Value::as_str).unwrap_or_default();
    let platform = link_detector::detect_platform(url).unwrap_or(Platform::Other);
    record.insert("platform".to_string(), Value::from(platform.as_str()));
}

impl<B: StorageBackend> BookmarkStoreTrait for BookmarkStore<B> {
    fn get_all(&self) -> Vec<Bookmark> {
        self.load().unwrap_or_else(|e| {
            warn!("Failed to read bookmarks: {}", e);
            Vec::new()
        })
    }

    fn add(&mut self, bookmark: Bookmark) -> Result<(), StorageError> {
        let mut bookmarks = self.load()?;
        debug!("Adding bookmark {}", bookmark.id);
        bookmarks.insert(0, bookmark);
        self.save(&bookmarks)
    }

    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<bool, StorageError> {
        let mut bookmarks = self.load()?;
        let Some(bookmark) = bookmarks.iter_mut().find(|b| b.id == id) else {
            debug!("Ignoring update for unknown bookmark {}", id);
            return Ok(false);
        };
        patch.apply_to(bookmark);
        self.save(&bookmarks)?;
        Ok(true)
    }

    fn delete(&mut self, id: &str) -> Result<(), StorageError> {
        let mut bookmarks = self.load()?;
        bookmarks.retain(|b| b.id != id);
        self.save(&bookmarks)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        info!("Clearing all bookmarks");
        self.backend.remove(STORAGE_KEY)
    }

    fn export(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(&self.get_all())?)
    }

    fn import(&mut self, data: &str) -> Result<bool, StorageError> {
        let existing = self.load()?;
        let Some(plan) = Self::plan_import(&existing, data) else {
            return Ok(false);
        };

        let now = Self::now();
        let mut merged = plan.accepted;
        for bookmark in merged.iter_mut() {
            if bookmark.created_at == 0 {
                bookmark.created_at = now;
            }
        }
        merged.extend(existing);
        self.save(&merged)?;

        info!(
            "Imported {} new bookmarks ({} duplicates skipped)",
            plan.stats.new, plan.stats.duplicates
        );
        Ok(true)
    }

    fn import_stats(&self, data: &str) -> Option<ImportStats> {
        Self::plan_import(&self.get_all(), data).map(|plan| plan.stats)
    }
}
