//! In-memory page document.
//!
//! A flat node table in document order, loadable from JSON, implementing
//! [`PageDocument`]. Used by the CLI to search a captured page and by tests
//! to simulate visibility, overlay ancestry and detachment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::core::item::NodeId;
use crate::error::{SpotlightError, SpotlightResult};
use crate::platform::{ElementInfo, PageDocument, PageLocation};

fn default_true() -> bool {
    true
}

/// One node of a captured page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticNode {
    pub tag: String,
    /// Full descendant text
    #[serde(default)]
    pub text: String,
    /// Direct text-node children
    #[serde(default)]
    pub own_text: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub in_overlay: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub aria_label: Option<String>,
}

impl StaticNode {
    /// A visible node whose only content is one text node.
    pub fn text(tag: &str, text: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            text: text.to_string(),
            own_text: vec![text.to_string()],
            visible: true,
            ..Default::default()
        }
    }

    /// A visible container with its own text nodes and nested descendant text.
    pub fn container(tag: &str, own_text: &[&str], descendant_text: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            text: descendant_text.to_string(),
            own_text: own_text.iter().map(|s| s.to_string()).collect(),
            visible: true,
            ..Default::default()
        }
    }

    /// An anchor with link text.
    pub fn link(text: &str, href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            ..Self::text("a", text)
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn inside_overlay(mut self) -> Self {
        self.in_overlay = true;
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_aria_label(mut self, label: &str) -> Self {
        self.aria_label = Some(label.to_string());
        self
    }
}

/// JSON shape of a captured page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<StaticNode>,
}

/// In-memory [`PageDocument`].
#[derive(Debug)]
pub struct StaticDocument {
    location: PageLocation,
    title: String,
    nodes: Vec<StaticNode>,
    detached: Mutex<HashSet<usize>>,
    highlighted: Mutex<HashSet<usize>>,
    scrolled: Mutex<Vec<NodeId>>,
}

impl StaticDocument {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            location: PageLocation::parse(url),
            title: title.to_string(),
            nodes: Vec::new(),
            detached: Mutex::new(HashSet::new()),
            highlighted: Mutex::new(HashSet::new()),
            scrolled: Mutex::new(Vec::new()),
        }
    }

    pub fn from_snapshot(snapshot: PageSnapshot) -> Self {
        let mut doc = Self::new(&snapshot.url, &snapshot.title);
        doc.nodes = snapshot.nodes;
        doc
    }

    /// Load a captured page from a JSON file.
    pub fn load(path: &Path) -> SpotlightResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SpotlightError::Snapshot(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let snapshot: PageSnapshot = serde_json::from_str(&content)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Append a node, returning its id.
    pub fn push(&mut self, node: StaticNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn with_node(mut self, node: StaticNode) -> Self {
        self.push(node);
        self
    }

    /// Remove a node from the document, as a page mutation would.
    pub fn detach(&self, node: NodeId) {
        if let Ok(mut detached) = self.detached.lock() {
            detached.insert(node.0);
        }
        if let Ok(mut highlighted) = self.highlighted.lock() {
            highlighted.remove(&node.0);
        }
    }

    pub fn is_highlighted(&self, node: NodeId) -> bool {
        self.highlighted
            .lock()
            .map(|h| h.contains(&node.0))
            .unwrap_or(false)
    }

    /// Nodes currently carrying the highlight mark.
    pub fn highlighted_count(&self) -> usize {
        self.highlighted.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Nodes scrolled to, in order.
    pub fn scrolled(&self) -> Vec<NodeId> {
        self.scrolled.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl PageDocument for StaticDocument {
    fn location(&self) -> &PageLocation {
        &self.location
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn select(&self, tags: &[&str]) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(idx, node)| {
                self.is_attached(NodeId(*idx))
                    && tags.iter().any(|t| t.eq_ignore_ascii_case(&node.tag))
            })
            .map(|(idx, _)| NodeId(idx))
            .collect()
    }

    fn element(&self, node: NodeId) -> Option<ElementInfo> {
        if !self.is_attached(node) {
            return None;
        }
        let n = self.nodes.get(node.0)?;
        Some(ElementInfo {
            tag: n.tag.to_lowercase(),
            text_content: n.text.clone(),
            direct_text: n.own_text.clone(),
            has_layout_box: n.visible,
            in_overlay: n.in_overlay,
            role: n.role.clone(),
            href: n.href.clone(),
            title_attr: n.title.clone(),
            aria_label: n.aria_label.clone(),
        })
    }

    fn is_attached(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
            && self
                .detached
                .lock()
                .map(|d| !d.contains(&node.0))
                .unwrap_or(false)
    }

    fn scroll_into_view(&self, node: NodeId) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        if let Ok(mut scrolled) = self.scrolled.lock() {
            scrolled.push(node);
        }
        true
    }

    fn set_highlighted(&self, node: NodeId, on: bool) {
        if let Ok(mut highlighted) = self.highlighted.lock() {
            if on && self.is_attached(node) {
                highlighted.insert(node.0);
            } else {
                highlighted.remove(&node.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_in_document_order() {
        let doc = StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::text("h1", "Title"))
            .with_node(StaticNode::text("p", "Body"))
            .with_node(StaticNode::text("H2", "Section"));

        assert_eq!(doc.select(&["h1", "h2"]), vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn test_detach_hides_node() {
        let doc = StaticDocument::new("https://a.com/", "A").with_node(StaticNode::text("p", "x"));
        doc.set_highlighted(NodeId(0), true);
        assert!(doc.is_highlighted(NodeId(0)));

        doc.detach(NodeId(0));
        assert!(!doc.is_attached(NodeId(0)));
        assert!(doc.element(NodeId(0)).is_none());
        assert!(!doc.scroll_into_view(NodeId(0)));
        assert!(!doc.is_highlighted(NodeId(0)));
        assert!(doc.select(&["p"]).is_empty());
    }

    #[test]
    fn test_snapshot_json_defaults() {
        let json = r#"{
            "url": "https://a.com/docs",
            "title": "Docs",
            "nodes": [{"tag": "p", "text": "Hello"}, {"tag": "a", "text": "Next", "href": "/next", "visible": false}]
        }"#;
        let snapshot: PageSnapshot = serde_json::from_str(json).unwrap();
        let doc = StaticDocument::from_snapshot(snapshot);

        let p = doc.element(NodeId(0)).unwrap();
        assert!(p.has_layout_box);
        let a = doc.element(NodeId(1)).unwrap();
        assert!(!a.has_layout_box);
        assert_eq!(a.href.as_deref(), Some("/next"));
        assert_eq!(doc.location().hostname, "a.com");
    }
}
