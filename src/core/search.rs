//! Search engine for spotlight - platform-agnostic search logic.
//!
//! Wraps one session's [`FuzzyIndex`] and [`Ranker`] and turns a raw query
//! into a [`SearchOutcome`]: the prompt state, the "type more" hint, a
//! no-results state with a web-search fallback, or the ranked results.

use serde::Serialize;

use super::index::{FuzzyIndex, MatchCandidate, MatcherConfig};
use super::item::SearchableItem;
use super::rank::Ranker;

/// External search engine used when nothing matches.
pub const FALLBACK_SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Web-search link for the literal query.
pub fn fallback_search_url(query: &str) -> String {
    format!("{}{}", FALLBACK_SEARCH_URL, urlencoding::encode(query))
}

/// What the result area should show for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SearchOutcome {
    /// Empty query: show the prompt, not "no results"
    Prompt,

    /// Query shorter than the minimum length
    TypeMore { min_len: usize },

    /// The matcher found nothing
    NoResults { query: String, fallback_url: String },

    /// Ranked, capped results
    Results { results: Vec<MatchCandidate> },
}

impl SearchOutcome {
    /// Ranked results, empty for every other state.
    pub fn results(&self) -> &[MatchCandidate] {
        match self {
            SearchOutcome::Results { results } => results,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.results().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results().is_empty()
    }
}

/// The search engine for one session.
pub struct SearchEngine {
    index: FuzzyIndex,
    ranker: Ranker,
    min_query_length: Option<usize>,
}

impl SearchEngine {
    /// Build the index over `items`. The item set is fixed for the
    /// lifetime of the engine.
    pub fn new(items: Vec<SearchableItem>, matcher: MatcherConfig, ranker: Ranker) -> Self {
        Self {
            index: FuzzyIndex::build(items, matcher),
            ranker,
            min_query_length: None,
        }
    }

    /// Require at least `min` characters before matching. `None` disables
    /// the gate.
    pub fn with_min_query_length(mut self, min: Option<usize>) -> Self {
        self.min_query_length = min.filter(|m| *m > 0);
        self
    }

    pub fn items(&self) -> &[SearchableItem] {
        self.index.items()
    }

    pub fn item(&self, index: usize) -> Option<&SearchableItem> {
        self.index.item(index)
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Run one query.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Prompt;
        }

        if let Some(min_len) = self.min_query_length {
            if query.chars().count() < min_len {
                return SearchOutcome::TypeMore { min_len };
            }
        }

        let candidates = self.index.search(query);
        let total = candidates.len();
        let results = self.ranker.rank(self.index.items(), candidates, query);
        tracing::debug!("Query {:?}: {} matches, {} shown", query, total, results.len());

        if results.is_empty() {
            SearchOutcome::NoResults {
                query: query.to_string(),
                fallback_url: fallback_search_url(query),
            }
        } else {
            SearchOutcome::Results { results }
        }
    }
}
