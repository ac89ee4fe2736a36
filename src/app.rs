//! App Core for LinkStash.
//!
//! Wires configuration to a storage backend, the bookmark store, the preview
//! client and the bookmark service, and owns the runtime that drives the one
//! asynchronous operation (adding a bookmark).

use tokio::runtime::{Builder, Runtime};
use tracing::info;

use crate::config::Config;
use crate::database::Database;
use crate::managers::bookmark_store::BookmarkStore;
use crate::services::bookmark_service::BookmarkService;
use crate::services::preview_fetcher::LinkPreviewClient;
use crate::storage::{BackendKind, FileBackend, MemoryBackend, SqliteBackend, StorageBackend};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{BookmarkError, StorageError};

/// Backend chosen at startup from configuration.
pub type AppBackend = Box<dyn StorageBackend + Send>;

/// The service type the application runs.
pub type AppService = BookmarkService<BookmarkStore<AppBackend>, LinkPreviewClient>;

/// Opens the backend selected by `config`. Sqlite and file backends create the data
/// directory on first use.
pub fn open_backend(config: &Config) -> Result<AppBackend, StorageError> {
    match config.backend {
        BackendKind::Sqlite => {
            let db = Database::open(config.database_path())?;
            Ok(Box::new(SqliteBackend::new(db)))
        }
        BackendKind::File => Ok(Box::new(FileBackend::new(&config.data_dir))),
        BackendKind::Memory => Ok(Box::new(MemoryBackend::new())),
    }
}

/// Central application struct.
pub struct App {
    pub config: Config,
    pub service: AppService,
    runtime: Runtime,
}

impl App {
    /// Creates a new App from `config`.
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let backend = open_backend(&config)?;
        let fetcher = LinkPreviewClient::new(&config.preview)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let service = BookmarkService::new(BookmarkStore::new(backend), fetcher);

        info!(
            "LinkStash ready: {:?} backend in {}, {} bookmarks",
            config.backend,
            config.data_dir.display(),
            service.bookmarks().len()
        );

        Ok(Self {
            config,
            service,
            runtime,
        })
    }

    /// Adds a bookmark, blocking until the preview fetch and write complete.
    pub fn add_bookmark(&mut self, url: &str) -> Result<Bookmark, BookmarkError> {
        self.runtime.block_on(self.service.add_bookmark(url))
    }
}
