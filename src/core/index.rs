//! Weighted multi-field fuzzy index.
//!
//! Built once per session over the aggregated items. The skim matcher from
//! `fuzzy-matcher` supplies the alignment (which characters matched); this
//! module turns an alignment into a normalized field score where `0.0` is an
//! exact substring at the expected location and larger is worse, then
//! combines matched fields with their declared weights.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use super::item::SearchableItem;

/// Inclusive character range `(start, end)` within a field's text.
pub type MatchRange = (usize, usize);

/// Item fields the index can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    Title,
    /// The precomputed display URL, so ranges line up with rendered text
    Url,
    Content,
}

impl SearchField {
    pub fn text<'a>(&self, item: &'a SearchableItem) -> &'a str {
        match self {
            SearchField::Title => &item.title,
            SearchField::Url => &item.display_url,
            SearchField::Content => &item.content,
        }
    }
}

/// Relative weight of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeight {
    pub field: SearchField,
    pub weight: f64,
}

impl FieldWeight {
    pub const fn new(field: SearchField, weight: f64) -> Self {
        Self { field, weight }
    }
}

/// Matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum accepted field score (lower = stricter)
    pub threshold: f64,
    /// When false, distance from the start of the text adds to the score
    pub ignore_location: bool,
    /// Characters from the start that cost a full point of score
    pub distance: usize,
    /// Matched runs shorter than this are discarded
    pub min_match_char_length: usize,
    pub keys: Vec<FieldWeight>,
}

impl MatcherConfig {
    /// Strict, location-aware matching for the in-page overlay.
    pub fn overlay() -> Self {
        Self {
            threshold: 0.2,
            ignore_location: false,
            distance: 100,
            min_match_char_length: 2,
            keys: vec![
                FieldWeight::new(SearchField::Title, 2.0),
                FieldWeight::new(SearchField::Url, 1.0),
                FieldWeight::new(SearchField::Content, 0.5),
            ],
        }
    }

    /// Looser matching for the toolbar popup; location is ignored.
    pub fn popup() -> Self {
        Self {
            threshold: 0.4,
            ignore_location: true,
            distance: 100,
            min_match_char_length: 2,
            keys: vec![
                FieldWeight::new(SearchField::Title, 2.0),
                FieldWeight::new(SearchField::Url, 1.0),
            ],
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::overlay()
    }
}

/// How one field matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field: SearchField,
    pub score: f64,
    pub ranges: Vec<MatchRange>,
}

/// One item accepted by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    /// Position of the item in the index
    pub item: usize,
    /// Combined weighted score, lower is better
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

impl MatchCandidate {
    pub fn field(&self, field: SearchField) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.field == field)
    }
}

/// Fuzzy index over one session's items.
pub struct FuzzyIndex {
    items: Vec<SearchableItem>,
    config: MatcherConfig,
    /// Field weights normalized to sum to 1
    weights: Vec<(SearchField, f64)>,
    matcher: SkimMatcherV2,
}

impl FuzzyIndex {
    pub fn build(items: Vec<SearchableItem>, config: MatcherConfig) -> Self {
        let positive: Vec<&FieldWeight> = config.keys.iter().filter(|k| k.weight > 0.0).collect();
        let total: f64 = positive.iter().map(|k| k.weight).sum();
        let weights = positive
            .iter()
            .map(|k| (k.field, k.weight / total))
            .collect();

        tracing::debug!("Built fuzzy index over {} items", items.len());

        Self {
            items,
            config,
            weights,
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn items(&self) -> &[SearchableItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&SearchableItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Every item with at least one field within threshold, in index order.
    pub fn search(&self, query: &str) -> Vec<MatchCandidate> {
        let pattern = query.trim();
        if pattern.is_empty() {
            return Vec::new();
        }
        let pattern_len = pattern.chars().count();

        self.items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| self.match_item(idx, item, pattern, pattern_len))
            .collect()
    }

    fn match_item(
        &self,
        idx: usize,
        item: &SearchableItem,
        pattern: &str,
        pattern_len: usize,
    ) -> Option<MatchCandidate> {
        let mut matches = Vec::new();
        let mut score = 1.0;

        for &(field, weight) in &self.weights {
            let text = field.text(item);
            if text.is_empty() {
                continue;
            }
            if let Some(m) = self.match_field(field, text, pattern, pattern_len) {
                score *= m.score.max(f64::EPSILON).powf(weight);
                matches.push(m);
            }
        }

        if matches.is_empty() {
            None
        } else {
            Some(MatchCandidate {
                item: idx,
                score,
                matches,
            })
        }
    }

    fn match_field(
        &self,
        field: SearchField,
        text: &str,
        pattern: &str,
        pattern_len: usize,
    ) -> Option<FieldMatch> {
        let (_, indices) = self.matcher.fuzzy_indices(text, pattern)?;
        let first = *indices.first()?;
        let last = *indices.last()?;

        // Characters skipped inside the matched span, relative to the query.
        let gaps = (last - first + 1).saturating_sub(indices.len());
        let mut score = (gaps as f64 / pattern_len as f64).min(1.0);

        if !self.config.ignore_location {
            score += match self.config.distance {
                0 if first == 0 => 0.0,
                0 => 1.0,
                distance => first as f64 / distance as f64,
            };
        }
        if score > self.config.threshold {
            return None;
        }

        let ranges: Vec<MatchRange> = contiguous_ranges(&indices)
            .into_iter()
            .filter(|(start, end)| end - start + 1 >= self.config.min_match_char_length)
            .collect();
        if ranges.is_empty() {
            return None;
        }

        Some(FieldMatch {
            field,
            score,
            ranges,
        })
    }
}

/// Group sorted character indices into inclusive runs.
pub fn contiguous_ranges(indices: &[usize]) -> Vec<MatchRange> {
    let mut ranges: Vec<MatchRange> = Vec::new();
    for &idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end + 1 == idx => *end = idx,
            _ => ranges.push((idx, idx)),
        }
    }
    ranges
}
