//! Searchable item model and normalization helpers.
//!
//! Every source (page text, page links, tabs, bookmarks, history) is reduced
//! to a [`SearchableItem`] before indexing. The item carries a precomputed
//! display URL, the current-site flag used by ranking, and (for page items
//! only) a session-scoped handle back to the originating document node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Number of characters of the lowercased text used as the dedup key.
pub const DEDUP_KEY_CHARS: usize = 50;

/// Maximum path characters kept by [`format_url`].
const DISPLAY_PATH_CHARS: usize = 40;

/// Maximum characters kept when the URL cannot be parsed.
const DISPLAY_RAW_CHARS: usize = 50;

/// Fallback title for records that arrive without one.
pub const UNTITLED: &str = "Untitled";

/// The four item types the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Page,
    Tab,
    Bookmark,
    History,
}

impl ItemKind {
    /// All kinds in default priority order.
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Page,
        ItemKind::Tab,
        ItemKind::Bookmark,
        ItemKind::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Page => "page",
            ItemKind::Tab => "tab",
            ItemKind::Bookmark => "bookmark",
            ItemKind::History => "history",
        }
    }

    /// Icon used when the source does not pick a more specific one.
    pub fn default_icon(&self) -> &'static str {
        match self {
            ItemKind::Page => "📄",
            ItemKind::Tab => "📑",
            ItemKind::Bookmark => "⭐",
            ItemKind::History => "📄",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" => Ok(ItemKind::Page),
            "tab" => Ok(ItemKind::Tab),
            "bookmark" => Ok(ItemKind::Bookmark),
            "history" => Ok(ItemKind::History),
            other => Err(format!("Unknown item type: {}", other)),
        }
    }
}

/// Identifies one open-to-close search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Index of a node in the live document's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Reference from a page item to the node it was extracted from.
///
/// Only valid inside the session that produced it; the node must be
/// re-checked for attachment before it is scrolled to or highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub session: SessionId,
    pub node: NodeId,
}

/// Source-specific data carried alongside the common fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemSource {
    Page,
    Tab {
        #[serde(rename = "tabId")]
        tab_id: i64,
        #[serde(rename = "windowId")]
        window_id: i64,
    },
    Bookmark {
        path: String,
    },
    History {
        #[serde(rename = "lastVisit")]
        last_visit: Option<f64>,
    },
}

impl ItemSource {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemSource::Page => ItemKind::Page,
            ItemSource::Tab { .. } => ItemKind::Tab,
            ItemSource::Bookmark { .. } => ItemKind::Bookmark,
            ItemSource::History { .. } => ItemKind::History,
        }
    }
}

/// The unit that is indexed, ranked and displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableItem {
    #[serde(flatten)]
    pub source: ItemSource,
    pub title: String,
    pub url: String,
    pub display_url: String,
    pub content: String,
    pub icon: String,
    pub is_current_site: bool,
    pub is_hidden: bool,
    #[serde(skip)]
    pub element: Option<ElementHandle>,
}

impl SearchableItem {
    /// A page-local item. Page items always belong to the current site.
    pub fn page(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        icon: impl Into<String>,
        element: Option<ElementHandle>,
    ) -> Self {
        let url = url.into();
        Self {
            source: ItemSource::Page,
            title: title.into(),
            display_url: format_url(&url),
            url,
            content: content.into(),
            icon: icon.into(),
            is_current_site: true,
            is_hidden: false,
            element,
        }
    }

    /// An open browser tab.
    pub fn tab(tab_id: i64, window_id: i64, title: &str, url: impl Into<String>) -> Self {
        Self::external(ItemSource::Tab { tab_id, window_id }, title, url.into(), String::new())
    }

    /// A bookmark; the folder breadcrumb doubles as its subtitle.
    pub fn bookmark(title: &str, url: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self::external(
            ItemSource::Bookmark { path: path.clone() },
            title,
            url.into(),
            path,
        )
    }

    /// A history entry.
    pub fn history(title: &str, url: impl Into<String>, last_visit: Option<f64>) -> Self {
        Self::external(ItemSource::History { last_visit }, title, url.into(), String::new())
    }

    fn external(source: ItemSource, title: &str, url: String, content: String) -> Self {
        let icon = source.kind().default_icon().to_string();
        Self {
            title: normalize_title(title),
            display_url: format_url(&url),
            url,
            content,
            icon,
            is_current_site: false,
            is_hidden: false,
            element: None,
            source,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.source.kind()
    }

    /// Tab and window ids when this item is a tab.
    pub fn tab_target(&self) -> Option<(i64, i64)> {
        match self.source {
            ItemSource::Tab { tab_id, window_id } => Some((tab_id, window_id)),
            _ => None,
        }
    }

    /// Recompute the current-site flag against the active page's hostname.
    pub fn with_current_site(mut self, hostname: &str) -> Self {
        self.is_current_site = is_same_host(&self.url, hostname);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.is_hidden = hidden;
        self
    }
}

/// Trimmed title, or [`UNTITLED`] when nothing is left.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Dedup key: lowercase text, first [`DEDUP_KEY_CHARS`] characters.
pub fn dedup_key(text: &str) -> String {
    text.to_lowercase().chars().take(DEDUP_KEY_CHARS).collect()
}

/// Hostname of `url`, or `None` if it does not parse.
pub fn hostname_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .map(|parsed| parsed.host_str().unwrap_or("").to_string())
}

/// Whether `url` points at `hostname`. Malformed URLs never match.
pub fn is_same_host(url: &str, hostname: &str) -> bool {
    hostname_of(url).is_some_and(|host| host == hostname)
}

/// Short host-relative rendering of a URL (`host/path...`).
pub fn format_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path();
            let mut display = parsed.host_str().unwrap_or("").to_string();
            display.push_str(&truncate_chars(path, DISPLAY_PATH_CHARS));
            if path.chars().count() > DISPLAY_PATH_CHARS {
                display.push_str("...");
            }
            display
        }
        Err(_) => {
            let mut display = truncate_chars(url, DISPLAY_RAW_CHARS);
            if url.chars().count() > DISPLAY_RAW_CHARS {
                display.push_str("...");
            }
            display
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ItemKind::ALL {
            assert_eq!(kind.as_str().parse::<ItemKind>().unwrap(), kind);
        }
        assert!("folder".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_format_url_host_and_path() {
        assert_eq!(
            format_url("https://github.com/rust-lang/rust?tab=readme"),
            "github.com/rust-lang/rust"
        );
    }

    #[test]
    fn test_format_url_truncates_long_path() {
        let long = format!("https://example.com/{}", "a".repeat(60));
        let display = format_url(&long);
        assert!(display.ends_with("..."));
        assert_eq!(display, format!("example.com/{}...", "a".repeat(39)));
    }

    #[test]
    fn test_format_url_unparseable() {
        assert_eq!(format_url(""), "");
        let junk = "not a url ".repeat(10);
        let display = format_url(&junk);
        assert_eq!(display.chars().count(), 53);
        assert!(display.ends_with("..."));
    }

    #[test]
    fn test_dedup_key_is_lowercase_prefix() {
        let text = format!("Hello World {}", "x".repeat(100));
        let key = dedup_key(&text);
        assert_eq!(key.chars().count(), DEDUP_KEY_CHARS);
        assert!(key.starts_with("hello world"));
        assert_eq!(dedup_key("ABC"), dedup_key("abc"));
    }

    #[test]
    fn test_same_host() {
        assert!(is_same_host("https://docs.rs/serde", "docs.rs"));
        assert!(!is_same_host("https://crates.io/", "docs.rs"));
        assert!(!is_same_host("::not a url::", "docs.rs"));
    }

    #[test]
    fn test_external_items_normalize_title() {
        let tab = SearchableItem::tab(1, 2, "   ", "https://a.com/");
        assert_eq!(tab.title, UNTITLED);
        assert_eq!(tab.kind(), ItemKind::Tab);
        assert_eq!(tab.tab_target(), Some((1, 2)));
        assert!(tab.element.is_none());
    }

    #[test]
    fn test_with_current_site() {
        let bookmark = SearchableItem::bookmark("Docs", "https://docs.rs/tokio", "Bar / Rust")
            .with_current_site("docs.rs");
        assert!(bookmark.is_current_site);
        assert_eq!(bookmark.content, "Bar / Rust");

        let history = SearchableItem::history("Broken", "nope", None).with_current_site("docs.rs");
        assert!(!history.is_current_site);
    }
}
