//! One open-to-close search session.
//!
//! Holds the item collection (through its engine), the current query and
//! outcome, and the selection cursor. A new session is built on every open;
//! nothing carries over from the previous one.

use crate::core::index::{MatchCandidate, MatcherConfig};
use crate::core::item::{SearchableItem, SessionId};
use crate::core::rank::Ranker;
use crate::core::search::{SearchEngine, SearchOutcome};

pub struct SearchSession {
    id: SessionId,
    engine: SearchEngine,
    recent: Vec<SearchableItem>,
    query: String,
    outcome: SearchOutcome,
    selected_index: usize,
}

impl SearchSession {
    pub fn new(
        id: SessionId,
        items: Vec<SearchableItem>,
        matcher: MatcherConfig,
        ranker: Ranker,
        min_query_length: Option<usize>,
    ) -> Self {
        Self {
            id,
            engine: SearchEngine::new(items, matcher, ranker).with_min_query_length(min_query_length),
            recent: Vec::new(),
            query: String::new(),
            outcome: SearchOutcome::Prompt,
            selected_index: 0,
        }
    }

    /// Recently visited entries for the prompt state.
    pub fn with_recent(mut self, recent: Vec<SearchableItem>) -> Self {
        self.recent = recent;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }

    pub fn items(&self) -> &[SearchableItem] {
        self.engine.items()
    }

    pub fn recent(&self) -> &[SearchableItem] {
        &self.recent
    }

    /// Re-run the search; the cursor returns to the top.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.outcome = self.engine.search(query);
        self.selected_index = 0;
    }

    pub fn results(&self) -> &[MatchCandidate] {
        self.outcome.results()
    }

    /// Ranked items in display order.
    pub fn result_items(&self) -> Vec<&SearchableItem> {
        self.results()
            .iter()
            .filter_map(|c| self.engine.item(c.item))
            .collect()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn select_next(&mut self) {
        let len = self.results().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.results().len();
        if len > 0 {
            self.selected_index = if self.selected_index == 0 {
                len - 1
            } else {
                self.selected_index - 1
            };
        }
    }

    /// Move the cursor to `index` if it is within the results.
    pub fn select_at(&mut self, index: usize) -> bool {
        if index < self.results().len() {
            self.selected_index = index;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&SearchableItem> {
        let candidate = self.results().get(self.selected_index)?;
        self.engine.item(candidate.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SearchSession {
        let items = vec![
            SearchableItem::tab(1, 1, "notes one", ""),
            SearchableItem::tab(2, 1, "notes two", ""),
            SearchableItem::tab(3, 1, "notes three", ""),
        ];
        SearchSession::new(
            SessionId(1),
            items,
            MatcherConfig::popup(),
            Ranker::default(),
            Some(2),
        )
    }

    #[test]
    fn test_starts_in_prompt_state() {
        let session = session();
        assert_eq!(session.outcome(), &SearchOutcome::Prompt);
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_wraparound_navigation() {
        let mut session = session();
        session.set_query("notes");
        assert_eq!(session.results().len(), 3);
        assert_eq!(session.selected_index(), 0);

        session.select_previous();
        assert_eq!(session.selected_index(), 2);

        session.select_next();
        assert_eq!(session.selected_index(), 0);

        session.select_at(2);
        session.select_next();
        assert_eq!(session.selected_index(), 0);
    }

    #[test]
    fn test_navigation_without_results_is_noop() {
        let mut session = session();
        session.set_query("zzqq");
        session.select_next();
        session.select_previous();
        assert_eq!(session.selected_index(), 0);
        assert!(!session.select_at(0));
    }

    #[test]
    fn test_new_query_resets_cursor() {
        let mut session = session();
        session.set_query("notes");
        session.select_at(1);
        session.set_query("notes t");
        assert_eq!(session.selected_index(), 0);
        assert_eq!(session.query(), "notes t");
    }

    #[test]
    fn test_selected_follows_ranking() {
        let mut session = session();
        session.set_query("notes two");
        assert_eq!(session.selected().map(|i| i.title.as_str()), Some("notes two"));
    }
}
