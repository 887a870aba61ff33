//! Multi-tier ranking of match candidates.
//!
//! Tiers are evaluated top to bottom and the first one that discriminates
//! wins. The primary tier is configurable: type priority (user ordering of
//! page/tab/bookmark/history) or site affinity (current site, then page
//! items). Sorting is stable and truncation happens after the full sort.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::index::MatchCandidate;
use super::item::{ItemKind, SearchableItem};

/// Default result cap.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Which rule sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryTier {
    /// User type ordering, then current site
    #[default]
    TypePriority,
    /// Current site, then page items
    SiteAffinity,
}

/// User ordering over the four item kinds.
///
/// Always holds each kind exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePriority(Vec<ItemKind>);

impl TypePriority {
    /// Normalize an ordering: duplicates are dropped, missing kinds appended
    /// in default order.
    pub fn new(order: impl IntoIterator<Item = ItemKind>) -> Self {
        let mut kinds: Vec<ItemKind> = Vec::with_capacity(ItemKind::ALL.len());
        for kind in order.into_iter().chain(ItemKind::ALL) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Self(kinds)
    }

    /// Build from stored type tags. Unknown tags are skipped.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        Self::new(tags.iter().filter_map(|tag| match tag.as_ref().parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::warn!("Ignoring type priority entry: {}", e);
                None
            }
        }))
    }

    /// Position of `kind`; lower sorts first.
    pub fn rank(&self, kind: ItemKind) -> usize {
        self.0
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(ItemKind::ALL.len())
    }

    pub fn kinds(&self) -> &[ItemKind] {
        &self.0
    }

    pub fn tags(&self) -> Vec<String> {
        self.0.iter().map(|k| k.as_str().to_string()).collect()
    }
}

impl Default for TypePriority {
    fn default() -> Self {
        Self(ItemKind::ALL.to_vec())
    }
}

/// Everything the comparator looks at for one candidate.
#[derive(Debug, Clone, Copy)]
struct SortKey {
    type_rank: usize,
    current_site: bool,
    is_page: bool,
    exact: bool,
    prefix: bool,
    url_contains: bool,
    score: f64,
}

/// Orders candidates and applies the result cap.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranker {
    pub primary: PrimaryTier,
    pub priority: TypePriority,
    pub max_results: usize,
    /// Extra tier after prefix: URL contains the query
    pub url_substring_tier: bool,
}

impl Ranker {
    pub fn new(primary: PrimaryTier, priority: TypePriority) -> Self {
        Self {
            primary,
            priority,
            max_results: DEFAULT_MAX_RESULTS,
            url_substring_tier: false,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_url_substring_tier(mut self, enabled: bool) -> Self {
        self.url_substring_tier = enabled;
        self
    }

    /// Sort every candidate, then keep the head of the sorted sequence.
    ///
    /// Candidates pointing outside `items` are dropped.
    pub fn rank(
        &self,
        items: &[SearchableItem],
        candidates: Vec<MatchCandidate>,
        query: &str,
    ) -> Vec<MatchCandidate> {
        let folded = query.trim().to_lowercase();

        let mut keyed: Vec<(SortKey, MatchCandidate)> = candidates
            .into_iter()
            .filter_map(|c| {
                let item = items.get(c.item)?;
                Some((self.key(item, c.score, &folded), c))
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));

        keyed
            .into_iter()
            .take(self.max_results)
            .map(|(_, c)| c)
            .collect()
    }

    fn key(&self, item: &SearchableItem, score: f64, folded_query: &str) -> SortKey {
        let title = item.title.to_lowercase();
        SortKey {
            type_rank: self.priority.rank(item.kind()),
            current_site: item.is_current_site,
            is_page: item.kind() == ItemKind::Page,
            exact: title == folded_query,
            prefix: title.starts_with(folded_query),
            url_contains: self.url_substring_tier
                && !folded_query.is_empty()
                && item.url.to_lowercase().contains(folded_query),
            score,
        }
    }

    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        let primary = match self.primary {
            PrimaryTier::TypePriority => a
                .type_rank
                .cmp(&b.type_rank)
                .then_with(|| b.current_site.cmp(&a.current_site)),
            PrimaryTier::SiteAffinity => {
                b.current_site.cmp(&a.current_site).then_with(|| {
                    if a.current_site && b.current_site {
                        b.is_page.cmp(&a.is_page)
                    } else {
                        Ordering::Equal
                    }
                })
            }
        };

        primary
            .then_with(|| b.exact.cmp(&a.exact))
            .then_with(|| b.prefix.cmp(&a.prefix))
            .then_with(|| b.url_contains.cmp(&a.url_contains))
            .then_with(|| a.score.total_cmp(&b.score))
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(PrimaryTier::default(), TypePriority::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(item: usize, score: f64) -> MatchCandidate {
        MatchCandidate {
            item,
            score,
            matches: Vec::new(),
        }
    }

    fn titles<'a>(items: &'a [SearchableItem], ranked: &[MatchCandidate]) -> Vec<&'a str> {
        ranked.iter().map(|c| items[c.item].title.as_str()).collect()
    }

    #[test]
    fn test_type_priority_normalizes() {
        let priority = TypePriority::from_tags(&["history", "bogus", "tab", "history"]);
        assert_eq!(
            priority.kinds(),
            &[ItemKind::History, ItemKind::Tab, ItemKind::Page, ItemKind::Bookmark]
        );
        assert_eq!(priority.rank(ItemKind::History), 0);
        assert_eq!(TypePriority::default().tags(), vec!["page", "tab", "bookmark", "history"]);
    }

    #[test]
    fn test_current_site_beats_better_score() {
        let items = vec![
            SearchableItem::tab(1, 1, "Docs A", "https://a.com/").with_current_site("a.com"),
            SearchableItem::tab(2, 1, "Docs B", "https://b.com/").with_current_site("a.com"),
        ];
        let ranker = Ranker::default();
        let ranked = ranker.rank(&items, vec![candidate(1, 0.1), candidate(0, 0.9)], "doc");
        assert_eq!(titles(&items, &ranked), vec!["Docs A", "Docs B"]);

        let site_first = Ranker::new(PrimaryTier::SiteAffinity, TypePriority::default());
        let ranked = site_first.rank(&items, vec![candidate(1, 0.1), candidate(0, 0.9)], "doc");
        assert_eq!(titles(&items, &ranked), vec!["Docs A", "Docs B"]);
    }

    #[test]
    fn test_type_priority_beats_site() {
        let items = vec![
            SearchableItem::history("Rust", "https://a.com/", None).with_current_site("a.com"),
            SearchableItem::tab(1, 1, "Rust", "https://b.com/"),
        ];
        let ranked = Ranker::default().rank(&items, vec![candidate(0, 0.0), candidate(1, 0.5)], "rust");
        assert_eq!(items[ranked[0].item].kind(), ItemKind::Tab);

        let custom = Ranker::new(
            PrimaryTier::TypePriority,
            TypePriority::new([ItemKind::History]),
        );
        let ranked = custom.rank(&items, vec![candidate(1, 0.0), candidate(0, 0.5)], "rust");
        assert_eq!(items[ranked[0].item].kind(), ItemKind::History);
    }

    #[test]
    fn test_site_affinity_puts_page_items_first() {
        let items = vec![
            SearchableItem::tab(1, 1, "Pricing", "https://a.com/p").with_current_site("a.com"),
            SearchableItem::page("Pricing", "https://a.com/", "", "📝", None),
        ];
        let ranker = Ranker::new(PrimaryTier::SiteAffinity, TypePriority::default());
        let ranked = ranker.rank(&items, vec![candidate(0, 0.0), candidate(1, 0.3)], "pri");
        assert_eq!(items[ranked[0].item].kind(), ItemKind::Page);
    }

    #[test]
    fn test_exact_title_then_prefix() {
        let items = vec![
            SearchableItem::tab(1, 1, "My github", ""),
            SearchableItem::tab(2, 1, "github issues", ""),
            SearchableItem::tab(3, 1, "GitHub", ""),
        ];
        let ranked = Ranker::default().rank(
            &items,
            vec![candidate(0, 0.01), candidate(1, 0.02), candidate(2, 0.5)],
            "github",
        );
        assert_eq!(titles(&items, &ranked), vec!["GitHub", "github issues", "My github"]);
    }

    #[test]
    fn test_url_substring_tier() {
        let items = vec![
            SearchableItem::bookmark("Code search", "https://grep.app/", ""),
            SearchableItem::bookmark("Code host", "https://codeberg.org/", ""),
        ];
        let candidates = || vec![candidate(0, 0.1), candidate(1, 0.2)];

        let plain = Ranker::default().rank(&items, candidates(), "codeberg");
        assert_eq!(plain[0].item, 0);

        let with_url = Ranker::default()
            .with_url_substring_tier(true)
            .rank(&items, candidates(), "codeberg");
        assert_eq!(with_url[0].item, 1);
    }

    #[test]
    fn test_score_breaks_remaining_ties_stably() {
        let items = vec![
            SearchableItem::tab(1, 1, "alpha", ""),
            SearchableItem::tab(2, 1, "beta", ""),
            SearchableItem::tab(3, 1, "gamma", ""),
        ];
        let ranked = Ranker::default().rank(
            &items,
            vec![candidate(0, 0.3), candidate(1, 0.1), candidate(2, 0.3)],
            "zz",
        );
        let order: Vec<usize> = ranked.iter().map(|c| c.item).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let items: Vec<SearchableItem> = (0..40)
            .map(|i| SearchableItem::history(&format!("entry {}", i % 7), "", None))
            .collect();
        let candidates: Vec<MatchCandidate> = (0..40)
            .map(|i| candidate(i, ((i * 13) % 5) as f64 / 10.0))
            .collect();
        let ranker = Ranker::default();

        let first = ranker.rank(&items, candidates.clone(), "entry 3");
        for _ in 0..5 {
            assert_eq!(ranker.rank(&items, candidates.clone(), "entry 3"), first);
        }
    }

    #[test]
    fn test_cap_applies_after_full_sort() {
        let mut items: Vec<SearchableItem> = (0..1000)
            .map(|i| SearchableItem::history(&format!("page {}", i), "", None))
            .collect();
        items.push(SearchableItem::tab(1, 1, "late tab", ""));

        let candidates: Vec<MatchCandidate> = (0..items.len())
            .map(|i| candidate(i, 0.1))
            .collect();
        let ranked = Ranker::default().rank(&items, candidates, "pa");

        assert_eq!(ranked.len(), DEFAULT_MAX_RESULTS);
        assert_eq!(ranked[0].item, 1000);
    }
}
