// LinkStash platform paths for Linux
// Data: ~/.local/share/linkstash

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_DATA_HOME/linkstash` if set, otherwise `~/.local/share/linkstash`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("linkstash"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("linkstash")
        }
    }
}
