use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform a bookmark was classified into when it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Twitter,
    Linkedin,
    Website,
    #[default]
    Other,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Youtube,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Website,
        Platform::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Website => "website",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// Represents a saved bookmark.
///
/// Serialized with camelCase keys. Keys this struct does not know about are kept
/// in `extra` so that imported records are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub platform: Platform,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Opaque preview payload, stored and forwarded but never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_preview: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bookmark {
    /// Creates a fresh, untagged, non-favorite bookmark.
    pub fn new(id: String, url: String, platform: Platform, title: String, created_at: i64) -> Self {
        Self {
            id,
            url,
            platform,
            title,
            image: None,
            tags: Vec::new(),
            favorite: false,
            created_at,
            raw_preview: None,
            extra: Map::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match against title, tags and URL.
    ///
    /// `query` must already be lower-cased.
    pub fn matches_query(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(query))
            || self.url.to_lowercase().contains(query)
    }
}

/// Fields that may be shallow-merged over an existing bookmark.
///
/// `id`, `url`, `platform` and `createdAt` are fixed at creation and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_preview: Option<Value>,
}

impl BookmarkPatch {
    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
            ..Self::default()
        }
    }

    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrites every field present in the patch, leaving the rest untouched.
    pub fn apply_to(self, bookmark: &mut Bookmark) {
        if let Some(title) = self.title {
            bookmark.title = title;
        }
        if let Some(image) = self.image {
            bookmark.image = Some(image);
        }
        if let Some(tags) = self.tags {
            bookmark.tags = tags;
        }
        if let Some(favorite) = self.favorite {
            bookmark.favorite = favorite;
        }
        if let Some(raw) = self.raw_preview {
            bookmark.raw_preview = Some(raw);
        }
    }
}

/// A view over the collection: everything, favorites only, or one platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    All,
    Favorites,
    Platform(Platform),
}

impl Category {
    pub fn includes(&self, bookmark: &Bookmark) -> bool {
        match self {
            Category::All => true,
            Category::Favorites => bookmark.favorite,
            Category::Platform(p) => bookmark.platform == *p,
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Category::All),
            "favorites" => Ok(Category::Favorites),
            other => other.parse::<Platform>().map(Category::Platform),
        }
    }
}

/// Counts reported before an import is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Candidates that passed validation.
    pub total: usize,
    /// Valid candidates that will be added.
    pub new: usize,
    /// Valid candidates skipped because their id is already taken.
    pub duplicates: usize,
}

/// Result of an import as seen by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ImportStats>,
}
