// LinkStash services
// Services provide the behavior around the store: platform detection, link previews,
// and the bookmark service that orchestrates them.

pub mod bookmark_service;
pub mod link_detector;
pub mod preview_fetcher;
