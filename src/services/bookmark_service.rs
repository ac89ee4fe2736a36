//! Bookmark Service for LinkStash.
//!
//! Orchestrates the link detector, the preview fetcher and the bookmark store, and
//! keeps an in-memory copy of the collection that is re-read from the store after
//! every mutation.
//!
//! Adding a bookmark moves through `idle → fetching-preview → resolving-image →
//! persisting → idle`; [`BookmarkService::is_loading`] is true for the duration.
//! The flag is shared through [`BookmarkService::loading_flag`] so other tasks can
//! watch it while an add is in flight, and a guard clears it even when the add
//! future is dropped.
//! Mutations take `&mut self`, so one service never interleaves its own writes.
//! Two services sharing a backend still race as last writer wins on the whole blob.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::services::link_detector;
use crate::services::preview_fetcher::PreviewFetcher;
use crate::types::bookmark::{Bookmark, BookmarkPatch, Category, ImportOutcome, Platform};
use crate::types::errors::{BookmarkError, StorageError};
use crate::types::preview::LinkPreview;

/// Returns the export file name for `date`: `bookmarks-<YYYY-MM-DD>.json`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("bookmarks-{}.json", date.format("%Y-%m-%d"))
}

/// Generates a bookmark id from the creation time plus a short random suffix.
pub fn generate_id(created_at: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", created_at, &suffix[..8])
}

/// Picks the image for a new bookmark.
///
/// The preview image wins. Otherwise YouTube links get the video thumbnail and
/// websites get a favicon; other platforms get nothing.
pub fn resolve_image(url: &str, platform: Platform, preview: &LinkPreview) -> Option<String> {
    if let Some(image) = preview.image() {
        return Some(image.to_string());
    }
    match platform {
        Platform::Youtube => link_detector::extract_youtube_video_id(url)
            .map(|id| link_detector::youtube_thumbnail(&id)),
        Platform::Website => Some(link_detector::favicon_url(url)),
        _ => None,
    }
}

/// RAII guard that raises the loading flag and lowers it when dropped.
/// A cancelled add drops its future, which drops this guard.
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag: flag.clone() }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Bookmark service over a store and a preview fetcher.
pub struct BookmarkService<S: BookmarkStoreTrait, F: PreviewFetcher> {
    store: S,
    fetcher: F,
    bookmarks: Vec<Bookmark>,
    loading: Arc<AtomicBool>,
}

impl<S: BookmarkStoreTrait, F: PreviewFetcher> BookmarkService<S, F> {
    /// Creates the service and loads the current collection from `store`.
    pub fn new(store: S, fetcher: F) -> Self {
        let bookmarks = store.get_all();
        debug!("Loaded {} bookmarks", bookmarks.len());
        Self {
            store,
            fetcher,
            bookmarks,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The collection as last read from the store, newest first.
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Shared handle to the loading flag, readable while an add holds `&mut self`.
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        self.loading.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn find(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Bookmark, BookmarkError> {
        self.find(id)
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    fn refresh(&mut self) {
        self.bookmarks = self.store.get_all();
    }

    /// Saves `url` as a new bookmark.
    ///
    /// # Errors
    /// Returns [`BookmarkError::InvalidUrl`] before touching the store if `url` does
    /// not parse, or [`BookmarkError::Storage`] if the write fails. A failed preview
    /// fetch is not an error; the title falls back to the hostname.
    pub async fn add_bookmark(&mut self, url: &str) -> Result<Bookmark, BookmarkError> {
        let url = url.trim();
        let platform = link_detector::detect_platform(url)?;

        let _guard = LoadingGuard::start(&self.loading);
        self.create_bookmark(url, platform).await
    }

    async fn create_bookmark(&mut self, url: &str, platform: Platform) -> Result<Bookmark, BookmarkError> {
        let preview = self.fetcher.fetch_preview(url).await;

        let title = preview
            .title()
            .map(str::to_string)
            .or_else(|| link_detector::hostname(url))
            .unwrap_or_else(|| url.to_string());
        let image = resolve_image(url, platform, &preview);

        let created_at = chrono::Utc::now().timestamp_millis();
        let mut bookmark = Bookmark::new(generate_id(created_at), url.to_string(), platform, title, created_at);
        bookmark.image = image;
        bookmark.raw_preview = serde_json::to_value(&preview).ok();

        self.store.add(bookmark.clone())?;
        self.refresh();
        info!("Added {} bookmark {} for {}", platform, bookmark.id, url);
        Ok(bookmark)
    }

    /// Shallow-merges `patch` over a bookmark. Returns `false` if `id` is unknown.
    pub fn update_bookmark(&mut self, id: &str, patch: BookmarkPatch) -> Result<bool, BookmarkError> {
        let updated = self.store.update(id, patch)?;
        self.refresh();
        Ok(updated)
    }

    pub fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        self.store.delete(id)?;
        self.refresh();
        info!("Deleted bookmark {}", id);
        Ok(())
    }

    /// Flips the favorite flag. Returns `false` if `id` is unknown.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, BookmarkError> {
        let Some(favorite) = self.find(id).map(|b| b.favorite) else {
            return Ok(false);
        };
        self.update_bookmark(id, BookmarkPatch::favorite(!favorite))
    }

    /// Appends `tag` unless the bookmark already has it (exact, case-sensitive match).
    ///
    /// Returns `true` only if the tag was added. Blank tags are ignored.
    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<bool, BookmarkError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Ok(false);
        }
        let Some(bookmark) = self.find(id) else {
            return Ok(false);
        };
        if bookmark.has_tag(tag) {
            return Ok(false);
        }
        let mut tags = bookmark.tags.clone();
        tags.push(tag.to_string());
        self.update_bookmark(id, BookmarkPatch::tags(tags))
    }

    /// Removes every occurrence of `tag`. Returns `false` if `id` is unknown.
    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<bool, BookmarkError> {
        let Some(bookmark) = self.find(id) else {
            return Ok(false);
        };
        let tags = bookmark.tags.iter().filter(|t| *t != tag).cloned().collect();
        self.update_bookmark(id, BookmarkPatch::tags(tags))
    }

    pub fn clear_all(&mut self) -> Result<(), BookmarkError> {
        self.store.clear()?;
        self.bookmarks.clear();
        Ok(())
    }

    pub fn export_data(&self) -> Result<String, BookmarkError> {
        Ok(self.store.export()?)
    }

    /// Imports a JSON array, reporting the counts computed before the merge.
    pub fn import_data(&mut self, data: &str) -> Result<ImportOutcome, BookmarkError> {
        let stats = self.store.import_stats(data);
        if !self.store.import(data)? {
            return Ok(ImportOutcome {
                success: false,
                stats: None,
            });
        }
        self.refresh();
        Ok(ImportOutcome {
            success: true,
            stats,
        })
    }

    /// Writes the export to `dir/bookmarks-<date>.json` and returns the path.
    pub fn export_to_dir(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf, BookmarkError> {
        let data = self.export_data()?;
        fs::create_dir_all(dir).map_err(StorageError::from)?;
        let path = dir.join(export_filename(date));
        fs::write(&path, data).map_err(StorageError::from)?;
        info!("Exported {} bookmarks to {}", self.bookmarks.len(), path.display());
        Ok(path)
    }

    pub fn import_from_file(&mut self, path: &Path) -> Result<ImportOutcome, BookmarkError> {
        let data = fs::read_to_string(path).map_err(StorageError::from)?;
        self.import_data(&data)
    }

    /// Bookmarks in `category` whose title, tags or URL contain `query` (case-insensitive).
    pub fn filter(&self, category: Category, query: &str) -> Vec<&Bookmark> {
        let query = query.trim().to_lowercase();
        self.bookmarks
            .iter()
            .filter(|b| category.includes(b))
            .filter(|b| query.is_empty() || b.matches_query(&query))
            .collect()
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.bookmarks.iter().filter(|b| category.includes(b)).count()
    }
}
