//! Browser source records.
//!
//! Shapes of the tab, bookmark and history records the host hands over,
//! plus the snapshot-backed host used by the CLI and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::item::UNTITLED;
use crate::error::{SpotlightError, SpotlightResult};
use crate::platform::{BrowserHost, HostResult};

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// An open tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTab {
    pub id: i64,
    pub window_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A node of the bookmark tree. Folders have children, leaves have a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<BookmarkNode>,
}

/// A flattened bookmark leaf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBookmark {
    pub title: String,
    pub url: String,
    /// Folder breadcrumb, e.g. `Bookmarks Bar / Rust`
    #[serde(default)]
    pub path: String,
}

/// A visited page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHistory {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub last_visit_time: Option<f64>,
}

impl RawHistory {
    /// Title, falling back to the URL and then to [`UNTITLED`].
    pub fn display_title(&self) -> String {
        [self.title.as_deref(), self.url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(UNTITLED)
            .to_string()
    }
}

/// Everything the host supplies for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSources {
    #[serde(default)]
    pub tabs: Vec<RawTab>,
    #[serde(default)]
    pub bookmarks: Vec<RawBookmark>,
    #[serde(default)]
    pub history: Vec<RawHistory>,
}

impl SearchSources {
    pub fn len(&self) -> usize {
        self.tabs.len() + self.bookmarks.len() + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flatten a bookmark tree into leaves with their folder breadcrumb.
pub fn flatten_bookmarks(roots: &[BookmarkNode]) -> Vec<RawBookmark> {
    let mut out = Vec::new();
    traverse_bookmarks(roots, "", &mut out);
    out
}

fn traverse_bookmarks(nodes: &[BookmarkNode], path: &str, out: &mut Vec<RawBookmark>) {
    for node in nodes {
        if let Some(ref url) = node.url {
            let title = if node.title.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                node.title.clone()
            };
            out.push(RawBookmark {
                title,
                url: url.clone(),
                path: path.to_string(),
            });
        }
        if !node.children.is_empty() {
            let child_path = if path.is_empty() {
                node.title.clone()
            } else {
                format!("{} / {}", path, node.title)
            };
            traverse_bookmarks(&node.children, &child_path, out);
        }
    }
}

/// How much history a session sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryWindow {
    pub days: u32,
    pub max_results: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            days: 30,
            max_results: 500,
        }
    }
}

/// Entries visited within the window, newest first, capped.
///
/// Entries without a visit time are dropped.
pub fn window_history(entries: &[RawHistory], now_ms: f64, window: HistoryWindow) -> Vec<RawHistory> {
    let start = now_ms - f64::from(window.days) * MS_PER_DAY;
    let mut kept: Vec<RawHistory> = entries
        .iter()
        .filter(|e| e.last_visit_time.is_some_and(|t| t >= start && t <= now_ms))
        .cloned()
        .collect();
    kept.sort_by(|a, b| {
        let ta = a.last_visit_time.unwrap_or_default();
        let tb = b.last_visit_time.unwrap_or_default();
        tb.total_cmp(&ta)
    });
    kept.truncate(window.max_results);
    kept
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}

// ============================================================================
// Snapshot host
// ============================================================================

/// On-disk snapshot of a browser profile: tabs, bookmark tree and history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub tabs: Vec<RawTab>,
    #[serde(default)]
    pub bookmarks: Vec<BookmarkNode>,
    #[serde(default)]
    pub history: Vec<RawHistory>,
}

/// A request the snapshot host received.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    ActivateTab { tab_id: i64, window_id: i64 },
    OpenUrl(String),
    CopyText(String),
}

/// [`BrowserHost`] backed by a [`SourceSnapshot`].
///
/// Navigation requests are recorded rather than performed.
#[derive(Debug, Default)]
pub struct SnapshotHost {
    snapshot: SourceSnapshot,
    window: HistoryWindow,
    reject_fetch: bool,
    reject_requests: bool,
    requests: Mutex<Vec<HostRequest>>,
}

impl SnapshotHost {
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> SpotlightResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SpotlightError::Snapshot(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let snapshot: SourceSnapshot = serde_json::from_str(&content)?;
        Ok(Self::new(snapshot))
    }

    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    /// Make `fetch_search_sources` fail.
    pub fn rejecting_fetch(mut self) -> Self {
        self.reject_fetch = true;
        self
    }

    /// Make navigation and clipboard requests fail.
    pub fn rejecting_requests(mut self) -> Self {
        self.reject_requests = true;
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<HostRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn record(&self, request: HostRequest) -> HostResult<()> {
        if self.reject_requests {
            return Err(format!("Host rejected {:?}", request));
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserHost for SnapshotHost {
    async fn fetch_search_sources(&self) -> HostResult<SearchSources> {
        if self.reject_fetch {
            return Err("Source fetch rejected".to_string());
        }
        Ok(SearchSources {
            tabs: self.snapshot.tabs.clone(),
            bookmarks: flatten_bookmarks(&self.snapshot.bookmarks),
            history: window_history(&self.snapshot.history, now_ms(), self.window),
        })
    }

    async fn activate_tab(&self, tab_id: i64, window_id: i64) -> HostResult<()> {
        self.record(HostRequest::ActivateTab { tab_id, window_id })
    }

    async fn open_url(&self, url: &str) -> HostResult<()> {
        self.record(HostRequest::OpenUrl(url.to_string()))
    }

    async fn copy_text(&self, text: &str) -> HostResult<()> {
        self.record(HostRequest::CopyText(text.to_string()))
    }
}
