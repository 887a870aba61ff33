//! Collaborator seam.
//!
//! The engine never talks to a browser or a DOM directly. The host supplies
//! tab/bookmark/history enumeration and navigation primitives through
//! [`BrowserHost`], and the active document through [`PageDocument`].

use async_trait::async_trait;
use url::Url;

use crate::core::item::NodeId;
use crate::services::browser::SearchSources;

/// Result of a collaborator request.
pub type HostResult<T> = Result<T, String>;

/// Browser-level operations supplied by the extension host.
///
/// Requests are fire-and-forget from the engine's point of view: a rejected
/// request is logged by the caller and never retried.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Enumerate tabs, bookmarks and history for a new session.
    async fn fetch_search_sources(&self) -> HostResult<SearchSources>;

    /// Activate a tab and focus its window.
    async fn activate_tab(&self, tab_id: i64, window_id: i64) -> HostResult<()>;

    /// Open a URL in a new tab.
    async fn open_url(&self, url: &str) -> HostResult<()>;

    /// Write text to the clipboard.
    async fn copy_text(&self, _text: &str) -> HostResult<()> {
        Err("Clipboard not supported by this host".to_string())
    }
}

/// Location of the active page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub url: String,
    pub origin: String,
    pub hostname: String,
}

impl PageLocation {
    /// Derive origin and hostname from a page URL. Unparseable URLs yield
    /// empty origin/hostname, which matches nothing.
    pub fn parse(url: &str) -> Self {
        match Url::parse(url) {
            Ok(parsed) => Self {
                url: url.to_string(),
                origin: parsed.origin().ascii_serialization(),
                hostname: parsed.host_str().unwrap_or("").to_string(),
            },
            Err(_) => Self {
                url: url.to_string(),
                origin: String::new(),
                hostname: String::new(),
            },
        }
    }
}

/// Read-only snapshot of one document node, as seen by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    /// Lowercase tag name (`p`, `h2`, `a`, ...)
    pub tag: String,
    /// Full descendant text content
    pub text_content: String,
    /// Text of direct text-node children only
    pub direct_text: Vec<String>,
    /// Whether the node currently has a layout box
    pub has_layout_box: bool,
    /// Whether the node lives inside the search overlay itself
    pub in_overlay: bool,
    pub role: Option<String>,
    /// Raw `href` attribute
    pub href: Option<String>,
    /// `title` attribute
    pub title_attr: Option<String>,
    pub aria_label: Option<String>,
}

/// The live page document the overlay is injected into.
pub trait PageDocument {
    fn location(&self) -> &PageLocation;

    /// Document title.
    fn title(&self) -> &str;

    /// Nodes whose tag is in `tags`, in document order.
    fn select(&self, tags: &[&str]) -> Vec<NodeId>;

    /// Snapshot of a node, or `None` if it no longer exists.
    fn element(&self, node: NodeId) -> Option<ElementInfo>;

    /// Whether the node is still attached to the document.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Smooth-scroll the node to the viewport center. Returns `false` if the
    /// node could not be scrolled to.
    fn scroll_into_view(&self, node: NodeId) -> bool;

    /// Apply or remove the visual highlight mark.
    fn set_highlighted(&self, node: NodeId, on: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        let location = PageLocation::parse("https://docs.rs/tokio/latest/tokio/#modules");
        assert_eq!(location.hostname, "docs.rs");
        assert_eq!(location.origin, "https://docs.rs");
    }

    #[test]
    fn test_location_parse_invalid() {
        let location = PageLocation::parse("about blank");
        assert!(location.hostname.is_empty());
        assert!(location.origin.is_empty());
    }
}
