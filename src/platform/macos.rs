// LinkStash platform paths for macOS
// Data: ~/Library/Application Support/LinkStash

use std::env;
use std::path::PathBuf;

/// `~/Library/Application Support/LinkStash`
pub fn get_data_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
        .join("LinkStash")
}
