//! Page content extraction.
//!
//! Walks the active document and produces the page-local items: a synthetic
//! "current page" item, then visible text blocks, then same-site links.
//! Extraction only reads the document.

use std::collections::HashSet;
use url::Url;

use super::item::{dedup_key, format_url, ElementHandle, NodeId, SearchableItem, SessionId};
use crate::platform::{ElementInfo, PageDocument};

/// Tags scanned for text blocks.
pub const TEXT_TAGS: &[&str] = &[
    "p", "li", "td", "th", "span", "div", "a", "h1", "h2", "h3", "h4", "h5", "h6", "label",
    "button",
];

/// Tags whose full descendant text is used. Everything else (div, span)
/// contributes only its direct text nodes.
const FULL_TEXT_TAGS: &[&str] = &[
    "p", "li", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "label", "button", "a",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Extraction limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub max_items: usize,
    pub min_text_len: usize,
    pub max_text_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_items: 200,
            min_text_len: 3,
            max_text_len: 300,
        }
    }
}

/// Display strings attached to page items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLabels {
    pub current_page: String,
    pub you_are_here: String,
    pub text_on_page: String,
    pub button: String,
    /// Suffix after the tag name, as in `H2 heading`
    pub heading: String,
}

impl Default for PageLabels {
    fn default() -> Self {
        Self {
            current_page: "Current Page".to_string(),
            you_are_here: "You are here".to_string(),
            text_on_page: "Text on this page".to_string(),
            button: "Button".to_string(),
            heading: "heading".to_string(),
        }
    }
}

/// What kind of element a text block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageElementKind {
    Heading(u8),
    Link,
    Button,
    Text,
}

impl PageElementKind {
    fn classify(info: &ElementInfo, resolved_href: Option<&str>) -> Self {
        if let Some(level) = heading_level(&info.tag) {
            PageElementKind::Heading(level)
        } else if info.tag == "a" && resolved_href.is_some() {
            PageElementKind::Link
        } else if info.tag == "button" || info.role.as_deref() == Some("button") {
            PageElementKind::Button
        } else {
            PageElementKind::Text
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PageElementKind::Heading(_) => "📍",
            PageElementKind::Link => "🔗",
            PageElementKind::Button => "🔘",
            PageElementKind::Text => "📝",
        }
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    if !HEADING_TAGS.contains(&tag) {
        return None;
    }
    tag[1..].parse().ok()
}

/// Extracts page-local items from a [`PageDocument`].
pub struct PageExtractor<'a> {
    doc: &'a dyn PageDocument,
    session: SessionId,
    options: ExtractOptions,
    labels: PageLabels,
}

impl<'a> PageExtractor<'a> {
    pub fn new(doc: &'a dyn PageDocument, session: SessionId) -> Self {
        Self {
            doc,
            session,
            options: ExtractOptions::default(),
            labels: PageLabels::default(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_labels(mut self, labels: PageLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Run extraction: current page, text blocks, then links, capped.
    pub fn extract(&self) -> Vec<SearchableItem> {
        let mut seen = HashSet::new();
        let mut items = vec![self.current_page_item()];
        self.extract_text_blocks(&mut seen, &mut items);
        self.extract_links(&mut seen, &mut items);
        items.truncate(self.options.max_items);
        tracing::debug!("Extracted {} page items", items.len());
        items
    }

    fn current_page_item(&self) -> SearchableItem {
        let title = self.doc.title().trim();
        let title = if title.is_empty() {
            self.labels.current_page.as_str()
        } else {
            title
        };
        SearchableItem::page(
            title,
            self.doc.location().url.clone(),
            self.labels.you_are_here.clone(),
            "📄",
            None,
        )
    }

    fn extract_text_blocks(&self, seen: &mut HashSet<String>, items: &mut Vec<SearchableItem>) {
        let page_url = &self.doc.location().url;

        for node in self.doc.select(TEXT_TAGS) {
            let Some(info) = self.doc.element(node) else {
                continue;
            };
            if !info.has_layout_box && info.tag != "body" {
                continue;
            }
            if info.in_overlay {
                continue;
            }

            let text = block_text(&info);
            if !self.accept(&text, seen) {
                continue;
            }

            let resolved = info.href.as_deref().and_then(|h| self.resolve(h));
            let kind = PageElementKind::classify(&info, resolved.as_ref().map(Url::as_str));
            let subtitle = match kind {
                PageElementKind::Heading(_) => {
                    format!("{} {}", info.tag.to_uppercase(), self.labels.heading)
                }
                PageElementKind::Link => resolved
                    .as_ref()
                    .map(|u| format_url(u.as_str()))
                    .unwrap_or_default(),
                PageElementKind::Button => self.labels.button.clone(),
                PageElementKind::Text => self.labels.text_on_page.clone(),
            };

            items.push(SearchableItem::page(
                text,
                page_url.clone(),
                subtitle,
                kind.icon(),
                Some(self.handle(node)),
            ));
        }
    }

    /// Same-site links, including hidden ones. Hidden links keep their
    /// handle and are still scrolled to when activated.
    fn extract_links(&self, seen: &mut HashSet<String>, items: &mut Vec<SearchableItem>) {
        let hostname = &self.doc.location().hostname;

        for node in self.doc.select(&["a"]) {
            let Some(info) = self.doc.element(node) else {
                continue;
            };
            let Some(href) = info.href.as_deref().map(str::trim) else {
                continue;
            };
            if href.is_empty() || href.starts_with("javascript:") || href.starts_with('#') {
                continue;
            }
            let Some(url) = self.resolve(href) else {
                tracing::debug!("Skipping malformed link {:?}", href);
                continue;
            };
            if url.host_str().unwrap_or("") != hostname {
                continue;
            }

            let title = link_title(&info);
            if !self.accept(&title, seen) {
                continue;
            }

            let display = format_url(url.as_str());
            items.push(
                SearchableItem::page(
                    title,
                    url.to_string(),
                    display,
                    PageElementKind::Link.icon(),
                    Some(self.handle(node)),
                )
                .with_hidden(!info.has_layout_box),
            );
        }
    }

    /// Length bounds plus dedup; records the key when accepted.
    fn accept(&self, text: &str, seen: &mut HashSet<String>) -> bool {
        let len = text.chars().count();
        if len < self.options.min_text_len || len > self.options.max_text_len {
            return false;
        }
        seen.insert(dedup_key(text))
    }

    fn resolve(&self, href: &str) -> Option<Url> {
        let base = Url::parse(&self.doc.location().origin).ok();
        match base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        }
    }

    fn handle(&self, node: NodeId) -> ElementHandle {
        ElementHandle {
            session: self.session,
            node,
        }
    }
}

fn block_text(info: &ElementInfo) -> String {
    if FULL_TEXT_TAGS.contains(&info.tag.as_str()) {
        info.text_content.trim().to_string()
    } else {
        info.direct_text
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Link text, then `title` attribute, then accessible label.
fn link_title(info: &ElementInfo) -> String {
    [
        Some(info.text_content.as_str()),
        info.title_attr.as_deref(),
        info.aria_label.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .unwrap_or("")
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{ItemKind, NodeId};
    use crate::services::document::{StaticDocument, StaticNode};

    fn extract(doc: &StaticDocument) -> Vec<SearchableItem> {
        PageExtractor::new(doc, SessionId(1)).extract()
    }

    fn titles(items: &[SearchableItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_current_page_item_comes_first() {
        let doc = StaticDocument::new("https://docs.rs/tokio", "Tokio docs")
            .with_node(StaticNode::text("p", "Runtime overview"));
        let items = extract(&doc);

        assert_eq!(items[0].title, "Tokio docs");
        assert_eq!(items[0].content, "You are here");
        assert!(items[0].element.is_none());
        assert_eq!(items[0].kind(), ItemKind::Page);
        assert!(items.iter().all(|i| i.is_current_site));
    }

    #[test]
    fn test_untitled_document_uses_label() {
        let doc = StaticDocument::new("https://a.com/", "  ");
        assert_eq!(extract(&doc)[0].title, "Current Page");
    }

    #[test]
    fn test_duplicate_text_yields_one_item() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::text("p", "Install the toolchain"))
            .with_node(StaticNode::text("li", "  INSTALL the toolchain  "));
        let items = extract(&doc);

        let count = items
            .iter()
            .filter(|i| i.title.eq_ignore_ascii_case("install the toolchain"))
            .count();
        assert_eq!(count, 1);
        assert_eq!(items[1].element.unwrap().node, NodeId(0));
    }

    #[test]
    fn test_dedup_ignores_text_past_fifty_chars() {
        let prefix = "x".repeat(50);
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::text("p", &format!("{}first", prefix)))
            .with_node(StaticNode::text("p", &format!("{}second", prefix)));
        let items = extract(&doc);
        assert_eq!(items.len(), 2);
        assert!(items[1].title.ends_with("first"));
    }

    #[test]
    fn test_length_bounds() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::text("p", "ok"))
            .with_node(StaticNode::text("p", &"y".repeat(301)))
            .with_node(StaticNode::text("p", "yes"));
        assert_eq!(titles(&extract(&doc)), vec!["A", "yes"]);
    }

    #[test]
    fn test_hidden_and_overlay_nodes_skipped() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::text("p", "Hidden paragraph").hidden())
            .with_node(StaticNode::text("span", "Overlay text").inside_overlay())
            .with_node(StaticNode::text("p", "Visible paragraph"));
        assert_eq!(titles(&extract(&doc)), vec!["A", "Visible paragraph"]);
    }

    #[test]
    fn test_containers_use_direct_text_only() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::container(
                "div",
                &["Intro", " words "],
                "Intro nested child text words",
            ))
            .with_node(StaticNode::container("div", &[], "Only nested text"));
        assert_eq!(titles(&extract(&doc)), vec!["A", "Intro words"]);
    }

    #[test]
    fn test_subtitles_and_icons() {
        let doc = StaticDocument::new("https://a.com/guide", "A")
            .with_node(StaticNode::text("h2", "Getting started"))
            .with_node(StaticNode::text("button", "Subscribe"))
            .with_node(StaticNode::text("span", "Clickable span").with_role("button"))
            .with_node(StaticNode::text("p", "Plain words"))
            .with_node(StaticNode::link("Changelog", "/changelog"));
        let items = extract(&doc);

        assert_eq!(items[1].content, "H2 heading");
        assert_eq!(items[1].icon, "📍");
        assert_eq!(items[2].content, "Button");
        assert_eq!(items[3].content, "Button");
        assert_eq!(items[4].content, "Text on this page");
        assert_eq!(items[5].content, "a.com/changelog");
        assert_eq!(items[5].icon, "🔗");
        assert_eq!(items[5].url, "https://a.com/guide");
    }

    #[test]
    fn test_links_same_site_only() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::link("Go", "/x").hidden().with_title("Internal docs"))
            .with_node(StaticNode::link("External site", "https://b.com/").hidden())
            .with_node(StaticNode::link("Script link", "javascript:void(0)").hidden())
            .with_node(StaticNode::link("Fragment link", "#top").hidden())
            .with_node(StaticNode::link("", "/y").hidden().with_aria_label("Labelled link"))
            .with_node(StaticNode::link("Broken link", "http://[::1").hidden());
        let items = extract(&doc);
        let links: Vec<&SearchableItem> = items.iter().skip(1).filter(|i| i.is_hidden).collect();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Labelled link");
        assert_eq!(links[0].url, "https://a.com/y");
        assert!(!titles(&items).contains(&"External site"));
        assert!(!titles(&items).contains(&"Script link"));
        assert!(!titles(&items).contains(&"Broken link"));
    }

    #[test]
    fn test_visible_link_seen_in_text_pass_is_not_repeated() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::link("Release notes", "/notes"));
        let items = extract(&doc);
        assert_eq!(titles(&items), vec!["A", "Release notes"]);
        assert!(!items[1].is_hidden);
    }

    #[test]
    fn test_cap_applies_after_ordering() {
        let mut doc = StaticDocument::new("https://a.com/", "A");
        for i in 0..20 {
            doc.push(StaticNode::text("p", &format!("Paragraph number {}", i)));
        }
        let items = PageExtractor::new(&doc, SessionId(1))
            .with_options(ExtractOptions {
                max_items: 5,
                ..Default::default()
            })
            .extract();

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[4].title, "Paragraph number 3");
    }

    #[test]
    fn test_handles_carry_session() {
        let doc = StaticDocument::new("https://a.com/", "A").with_node(StaticNode::text("p", "Some text"));
        let items = PageExtractor::new(&doc, SessionId(7)).extract();
        assert_eq!(items[1].element.unwrap().session, SessionId(7));
    }
}
