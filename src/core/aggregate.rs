//! Source aggregation: page items followed by tabs, bookmarks and history.

use crate::platform::{BrowserHost, HostResult};
use crate::services::browser::{window_history, HistoryWindow, RawHistory, SearchSources};

use super::item::SearchableItem;

/// Convert host records into items tagged against `hostname`.
///
/// Order is tabs, bookmarks, history, each as supplied.
pub fn external_items(sources: &SearchSources, hostname: &str) -> Vec<SearchableItem> {
    let mut items = Vec::with_capacity(sources.len());

    for tab in &sources.tabs {
        let title = tab.title.as_deref().unwrap_or_default();
        let url = tab.url.clone().unwrap_or_default();
        items.push(SearchableItem::tab(tab.id, tab.window_id, title, url).with_current_site(hostname));
    }

    for bookmark in &sources.bookmarks {
        items.push(
            SearchableItem::bookmark(&bookmark.title, bookmark.url.clone(), bookmark.path.clone())
                .with_current_site(hostname),
        );
    }

    items.extend(sources.history.iter().map(|entry| history_item(entry, hostname)));

    items
}

fn history_item(entry: &RawHistory, hostname: &str) -> SearchableItem {
    SearchableItem::history(
        &entry.display_title(),
        entry.url.clone().unwrap_or_default(),
        entry.last_visit_time,
    )
    .with_current_site(hostname)
}

/// Page items in extraction order, then the external items.
pub fn merge(
    page_items: Vec<SearchableItem>,
    sources: &SearchSources,
    hostname: &str,
) -> Vec<SearchableItem> {
    let mut items = page_items;
    items.extend(external_items(sources, hostname));
    items
}

/// Merge a host fetch result with the page items.
///
/// A failed fetch degrades to page items only.
pub fn merge_result(
    page_items: Vec<SearchableItem>,
    sources: &HostResult<SearchSources>,
    hostname: &str,
) -> Vec<SearchableItem> {
    match sources {
        Ok(sources) => {
            tracing::debug!(
                "Fetched {} tabs, {} bookmarks, {} history entries",
                sources.tabs.len(),
                sources.bookmarks.len(),
                sources.history.len()
            );
            merge(page_items, sources, hostname)
        }
        Err(e) => {
            tracing::warn!("Failed to fetch search sources: {}", e);
            page_items
        }
    }
}

/// Fetch sources from the host and merge them with the page items.
pub async fn collect(
    host: &dyn BrowserHost,
    page_items: Vec<SearchableItem>,
    hostname: &str,
) -> Vec<SearchableItem> {
    let sources = host.fetch_search_sources().await;
    merge_result(page_items, &sources, hostname)
}

/// Recently visited entries shown while the query is empty.
pub fn recent_items(
    history: &[RawHistory],
    now_ms: f64,
    days: u32,
    limit: usize,
    hostname: &str,
) -> Vec<SearchableItem> {
    let window = HistoryWindow {
        days,
        max_results: limit,
    };
    window_history(history, now_ms, window)
        .iter()
        .map(|entry| history_item(entry, hostname))
        .collect()
}
