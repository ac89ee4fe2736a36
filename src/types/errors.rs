use thiserror::Error;

// === StorageError ===

/// Errors raised by a storage backend while reading or writing a key.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system operation failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An SQLite operation failed.
    #[error("Storage database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// The collection could not be encoded as JSON.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// === BookmarkError ===

/// Errors related to bookmark operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The URL could not be parsed as an absolute URL with a host.
    #[error("Please enter a valid URL: {0}")]
    InvalidUrl(String),
    /// Bookmark with the given ID was not found.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// Reading from or writing to the backend failed.
    #[error("Bookmark storage error: {0}")]
    Storage(#[from] StorageError),
}

// === PreviewError ===

/// Errors from a single preview API request.
///
/// These never reach the bookmark service; the fetcher degrades to a hostname title.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The request could not be sent or the body could not be read.
    #[error("Preview network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("Preview API returned status {0}")]
    Status(u16),
    /// The response body was not a preview object.
    #[error("Preview parse error: {0}")]
    Parse(String),
}
