//! Core engine module - platform-agnostic business logic.
//!
//! This module contains everything that doesn't depend on a live browser:
//! - Searchable item model and normalization
//! - Page content extraction over a [`crate::platform::PageDocument`]
//! - Source aggregation
//! - Fuzzy index and multi-tier ranking
//! - The per-session search engine

pub mod aggregate;
pub mod extract;
pub mod index;
pub mod item;
pub mod rank;
pub mod search;

pub use extract::{ExtractOptions, PageExtractor, PageLabels};
pub use index::{FieldMatch, FuzzyIndex, MatchCandidate, MatcherConfig, SearchField};
pub use item::{ElementHandle, ItemKind, NodeId, SearchableItem, SessionId};
pub use rank::{PrimaryTier, Ranker, TypePriority};
pub use search::{fallback_search_url, SearchEngine, SearchOutcome};
