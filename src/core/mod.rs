//! Core engine module - pure search and ranking logic.
//!
//! The ranking functions perform no I/O and work over an immutable
//! [`CatalogIndex`] snapshot. [`SearchEngine`] adds history, which it
//! persists through an injected store:
//! - Catalog index and tag weights
//! - Per-category keyword scoring
//! - Word-level fuzzy matching
//! - Free-text search and ranking
//! - Tag-weighted similarity

pub mod catalog;
pub mod category;
pub mod fuzzy;
pub mod search;
pub mod similarity;

pub use catalog::{
    CatalogIndex, InstrumentKind, InstrumentRecord, SharedCatalog, TagWeightTable,
    DEFAULT_TAG_WEIGHT,
};
pub use category::{score_keyword, MatchCategory, MatchField};
pub use fuzzy::{fuzzy_match, levenshtein};
pub use search::{
    search, search_cancellable, CancelToken, GroupedResult, ScoredResult, SearchEngine,
};
pub use similarity::{find_similar, find_similar_with_limit, RelatedInstrument, MAX_RELATED};
