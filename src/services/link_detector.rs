//! Link Detector for LinkStash.
//!
//! Classifies a URL into a [`Platform`] by hostname and derives image URLs
//! (YouTube thumbnails, favicons) without touching the network.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::types::bookmark::Platform;
use crate::types::errors::BookmarkError;

/// Returned by [`favicon_url`] when the URL has no usable host.
pub const FALLBACK_ICON: &str = "/website-icon.jpg";

/// Tried in order; the first pattern that matches wins.
static YOUTUBE_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
        r"youtube\.com/watch\?.*v=([^&\n?#]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("YouTube id pattern must compile"))
    .collect()
});

/// Parses `url` as an absolute URL.
pub fn parse_url(url: &str) -> Result<Url, BookmarkError> {
    Url::parse(url.trim()).map_err(|e| BookmarkError::InvalidUrl(format!("{}: {}", url, e)))
}

/// Returns the lower-cased hostname of `url`, if it parses and has one.
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Classifies a hostname. Rules are checked in a fixed priority order.
pub fn classify_host(host: &str) -> Platform {
    let host = host.to_lowercase();
    if host.contains("youtube.com") || host.contains("youtu.be") {
        Platform::Youtube
    } else if host.contains("twitter.com") || host.contains("x.com") {
        Platform::Twitter
    } else if host.contains("linkedin.com") {
        Platform::Linkedin
    } else if host.contains('.') {
        Platform::Website
    } else {
        Platform::Other
    }
}

/// Classifies `url` by its hostname.
///
/// A URL without a host (e.g. `mailto:`) classifies as [`Platform::Other`].
///
/// # Errors
/// Returns [`BookmarkError::InvalidUrl`] if `url` is not an absolute URL.
pub fn detect_platform(url: &str) -> Result<Platform, BookmarkError> {
    let parsed = parse_url(url)?;
    Ok(classify_host(parsed.host_str().unwrap_or("")))
}

/// Extracts a YouTube video id from a watch, short or embed URL.
pub fn extract_youtube_video_id(url: &str) -> Option<String> {
    YOUTUBE_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn youtube_thumbnail(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

/// Returns a favicon service URL for the host of `url`.
pub fn favicon_url(url: &str) -> String {
    match hostname(url) {
        Some(host) => format!("https://www.google.com/s2/favicons?domain={}&sz=32", host),
        None => FALLBACK_ICON.to_string(),
    }
}
