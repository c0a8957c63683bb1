//! Search engine for tickerlens - free-text search and similarity entry point.
//!
//! The ranking functions here are pure over a catalog snapshot. The
//! [`SearchEngine`] wraps them and owns the only piece of mutable state, the
//! search history.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog::{CatalogIndex, InstrumentRecord};
use super::category::{score_keyword, MatchCategory};
use super::similarity::{find_similar_with_limit, RelatedInstrument, MAX_RELATED};
use crate::error::{LensError, LensResult};
use crate::services::history::{HistoryStore, SearchHistory, DEFAULT_HISTORY_LIMIT};

/// A record matched in one category, with its summed keyword score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub record: InstrumentRecord,
    pub score: u32,
}

/// All matches of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedResult {
    pub category: MatchCategory,
    /// Sorted by score, highest first.
    pub results: Vec<ScoredResult>,
    pub highest_score: u32,
}

/// Cooperative cancellation flag shared between a caller and a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Split a query into lowercased keywords.
pub fn keywords(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Rank the catalog against a free-text query.
///
/// A record appears in a category only if every keyword matched in that
/// category. Categories are ordered by their best score, then by priority.
pub fn search(query: &str, catalog: &CatalogIndex) -> Vec<GroupedResult> {
    // A fresh token is never cancelled
    search_cancellable(query, catalog, &CancelToken::new()).unwrap_or_default()
}

/// Same as [`search`], but gives up with [`LensError::Cancelled`] once the
/// token is set. The token is checked between categories.
pub fn search_cancellable(
    query: &str,
    catalog: &CatalogIndex,
    cancel: &CancelToken,
) -> LensResult<Vec<GroupedResult>> {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let mut groups = Vec::new();
    for category in MatchCategory::ALL {
        if cancel.is_cancelled() {
            return Err(LensError::Cancelled);
        }
        if let Some(group) = score_category(category, &keywords, catalog) {
            groups.push(group);
        }
    }

    // Stable: equal (score, priority) keeps evaluation order
    groups.sort_by(|a, b| {
        b.highest_score
            .cmp(&a.highest_score)
            .then_with(|| b.category.priority().cmp(&a.category.priority()))
    });

    log::debug!(
        "Query '{}' ({} keywords) matched {} categories",
        query,
        keywords.len(),
        groups.len()
    );
    Ok(groups)
}

fn score_category(
    category: MatchCategory,
    keywords: &[String],
    catalog: &CatalogIndex,
) -> Option<GroupedResult> {
    let mut results: Vec<ScoredResult> = catalog
        .records_of(category.kind())
        .filter_map(|record| {
            // Every keyword must match; one miss drops the record
            let total = keywords
                .iter()
                .map(|keyword| score_keyword(record, keyword, category))
                .sum::<Option<u32>>()?;
            Some(ScoredResult {
                record: record.clone(),
                score: total,
            })
        })
        .collect();

    if results.is_empty() {
        return None;
    }

    results.sort_by(|a, b| b.score.cmp(&a.score));
    let highest_score = results[0].score;

    Some(GroupedResult {
        category,
        results,
        highest_score,
    })
}

/// The search engine that powers free-text and similarity lookups.
///
/// Cheap to clone; clones share the same history.
#[derive(Clone)]
pub struct SearchEngine {
    history: Arc<Mutex<SearchHistory>>,
    store: Arc<dyn HistoryStore>,
    max_related: usize,
}

impl SearchEngine {
    /// Create an engine, loading history from the store.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self::with_limits(store, DEFAULT_HISTORY_LIMIT, MAX_RELATED)
    }

    pub fn with_limits(
        store: Arc<dyn HistoryStore>,
        history_limit: usize,
        max_related: usize,
    ) -> Self {
        let history = SearchHistory::load_from(store.as_ref(), history_limit);
        Self {
            history: Arc::new(Mutex::new(history)),
            store,
            max_related,
        }
    }

    /// Run a free-text search and record the query in history.
    pub fn search(&self, query: &str, catalog: &CatalogIndex) -> Vec<GroupedResult> {
        // A fresh token is never cancelled
        self.search_cancellable(query, catalog, &CancelToken::new())
            .unwrap_or_default()
    }

    /// Cancellable form of [`SearchEngine::search`]. A cancelled search does
    /// not touch history.
    pub fn search_cancellable(
        &self,
        query: &str,
        catalog: &CatalogIndex,
        cancel: &CancelToken,
    ) -> LensResult<Vec<GroupedResult>> {
        let groups = search_cancellable(query, catalog, cancel)?;
        if !keywords(query).is_empty() {
            self.record_query(query);
        }
        Ok(groups)
    }

    /// Instruments related to `symbol` by shared tags.
    pub fn find_similar(
        &self,
        symbol: &str,
        catalog: &CatalogIndex,
    ) -> LensResult<Vec<RelatedInstrument>> {
        find_similar_with_limit(symbol, catalog, self.max_related)
    }

    /// Past queries, most recent first.
    pub fn history(&self) -> Vec<String> {
        self.lock_history().list().to_vec()
    }

    /// History entries ranked against a partially typed query.
    pub fn suggestions(&self, partial: &str, max_results: usize) -> Vec<String> {
        self.lock_history().suggestions(partial, max_results)
    }

    pub fn remove_history(&self, query: &str) {
        let mut history = self.lock_history();
        if history.remove(query) {
            self.persist(&history);
        }
    }

    pub fn clear_history(&self) {
        let mut history = self.lock_history();
        history.clear();
        self.persist(&history);
    }

    fn record_query(&self, query: &str) {
        let mut history = self.lock_history();
        if history.record(query) {
            self.persist(&history);
        }
    }

    fn persist(&self, history: &SearchHistory) {
        if let Err(e) = self.store.save(history.list()) {
            log::warn!("Failed to save search history: {}", e);
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, SearchHistory> {
        match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{InstrumentKind, TagWeightTable};
    use crate::services::history::MemoryHistoryStore;
    use std::collections::HashMap;

    fn stock(symbol: &str, name: &str, tags: &[&str], d1: &str) -> InstrumentRecord {
        InstrumentRecord::new(InstrumentKind::Stock, symbol, name)
            .with_tags(tags.iter().copied())
            .with_descriptions(d1, "")
    }

    fn etf(symbol: &str, name: &str, tags: &[&str], d1: &str) -> InstrumentRecord {
        InstrumentRecord::new(InstrumentKind::Etf, symbol, name)
            .with_tags(tags.iter().copied())
            .with_descriptions(d1, "")
    }

    fn catalog() -> CatalogIndex {
        CatalogIndex::build(
            vec![
                stock(
                    "AAPL",
                    "Apple Inc.",
                    &["Technology", "Smartphones"],
                    "Makes the iPhone",
                ),
                stock(
                    "TSLA",
                    "Tesla, Inc.",
                    &["EV", "Automotive"],
                    "Electric vehicles and energy storage",
                ),
                stock(
                    "ALB",
                    "Albemarle Corporation",
                    &["Lithium", "Chemicals"],
                    "Lithium for EV batteries",
                ),
                stock(
                    "XOM",
                    "Exxon Mobil Corporation",
                    &["Energy", "Oil"],
                    "Integrated oil and gas",
                ),
            ],
            vec![
                etf(
                    "DRIV",
                    "Global X Autonomous & Electric Vehicles ETF",
                    &["EV", "Automotive"],
                    "Tracks electric vehicle makers",
                ),
                etf(
                    "XLE",
                    "Energy Select Sector SPDR Fund",
                    &["Energy"],
                    "Energy sector of the S&P 500",
                ),
            ],
            TagWeightTable::new(),
            HashMap::new(),
            HashMap::new(),
        )
    }

    fn category_order(groups: &[GroupedResult]) -> Vec<MatchCategory> {
        groups.iter().map(|g| g.category).collect()
    }

    fn symbols(group: &GroupedResult) -> Vec<&str> {
        group.results.iter().map(|r| r.record.symbol.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let catalog = catalog();
        assert!(search("", &catalog).is_empty());
        assert!(search("   \t ", &catalog).is_empty());
    }

    #[test]
    fn test_exact_symbol_leads() {
        let groups = search("AAPL", &catalog());
        assert_eq!(groups[0].category, MatchCategory::StockSymbol);
        assert_eq!(symbols(&groups[0]), vec!["AAPL"]);
        assert_eq!(groups[0].highest_score, 3);
    }

    #[test]
    fn test_fuzzy_symbol_scores_one() {
        let groups = search("APPL", &catalog());
        let symbol_group = groups
            .iter()
            .find(|g| g.category == MatchCategory::StockSymbol)
            .unwrap();
        assert_eq!(symbols(symbol_group), vec!["AAPL"]);
        assert_eq!(symbol_group.results[0].score, 1);

        let groups = search("XPPL", &catalog());
        assert!(groups
            .iter()
            .all(|g| g.category != MatchCategory::StockSymbol));
    }

    #[test]
    fn test_all_keywords_must_match_in_category() {
        let catalog = catalog();
        // Only TSLA has both words in its description
        let groups = search("electric energy", &catalog);
        let desc = groups
            .iter()
            .find(|g| g.category == MatchCategory::StockDescription)
            .unwrap();
        assert_eq!(symbols(desc), vec!["TSLA"]);
        assert_eq!(desc.highest_score, 4);

        // DRIV mentions "electric" but not "energy"
        assert!(groups
            .iter()
            .all(|g| g.category != MatchCategory::EtfDescription));
    }

    #[test]
    fn test_scores_sum_across_keywords() {
        let groups = search("ev automotive", &catalog());
        let tags = groups
            .iter()
            .find(|g| g.category == MatchCategory::StockTag)
            .unwrap();
        assert_eq!(symbols(tags), vec!["TSLA"]);
        assert_eq!(tags.results[0].score, 6);
    }

    fn plain_catalog(stocks: Vec<InstrumentRecord>) -> CatalogIndex {
        CatalogIndex::build(
            stocks,
            vec![],
            TagWeightTable::new(),
            HashMap::new(),
            HashMap::new(),
        )
    }

    #[test]
    fn test_higher_score_beats_priority() {
        let catalog = plain_catalog(vec![
            stock("SOLR", "Solaris Holdings", &[], ""),
            stock("BRGT", "Sol", &[], ""),
        ]);
        // Symbol substring scores 2, exact full name scores 4
        let groups = search("sol", &catalog);
        assert_eq!(groups[0].category, MatchCategory::StockName);
        assert_eq!(groups[0].highest_score, 4);
        let symbol_pos = category_order(&groups)
            .iter()
            .position(|c| *c == MatchCategory::StockSymbol)
            .unwrap();
        assert!(symbol_pos > 0);
    }

    #[test]
    fn test_category_ordering_by_highest_score() {
        let catalog = plain_catalog(vec![
            stock("ABC", "Widget Holdings", &[], "alpha beta"),
            stock("XYZ", "Alpha Beta Group", &[], ""),
        ]);
        let groups = search("alpha beta", &catalog);
        // Name: 3 + 3, description: 2 + 2
        assert_eq!(
            category_order(&groups),
            vec![MatchCategory::StockName, MatchCategory::StockDescription]
        );
        assert_eq!(groups[0].highest_score, 6);
        assert_eq!(groups[1].highest_score, 4);
    }

    #[test]
    fn test_priority_breaks_ties() {
        let catalog = plain_catalog(vec![
            stock("MOON", "Unrelated Co", &[], ""),
            stock("QQQX", "Another Co", &[], "moo cow"),
        ]);
        // Symbol substring and description word both score 2
        let groups = search("moo", &catalog);
        assert_eq!(
            category_order(&groups),
            vec![MatchCategory::StockSymbol, MatchCategory::StockDescription]
        );
        assert_eq!(groups[0].highest_score, groups[1].highest_score);
    }

    #[test]
    fn test_tag_priority_beats_earlier_name_category() {
        let catalog = plain_catalog(vec![
            stock("AAA1", "Moonstone Corp", &[], ""),
            stock("BBB2", "Other Co", &["Moonlight"], ""),
        ]);
        // Name is evaluated before tag, but both score 2 and tag ranks higher
        let groups = search("moon", &catalog);
        assert_eq!(
            category_order(&groups),
            vec![MatchCategory::StockTag, MatchCategory::StockName]
        );
    }

    #[test]
    fn test_results_sorted_within_category() {
        let catalog = plain_catalog(vec![
            stock("SOIL", "Soil Co", &["Soil"], ""),
            stock("GAS", "Gas Co", &["Oil & Gas"], ""),
            stock("OIL", "Oil Co", &["Oil"], ""),
        ]);
        let groups = search("oil", &catalog);
        let tags = groups
            .iter()
            .find(|g| g.category == MatchCategory::StockTag)
            .unwrap();
        // Exact first, then substring matches in catalog order
        assert_eq!(symbols(tags), vec!["OIL", "SOIL", "GAS"]);
        assert_eq!(tags.highest_score, 3);
    }

    #[test]
    fn test_search_is_deterministic() {
        let catalog = catalog();
        let first = search("energy oil", &catalog);
        for _ in 0..5 {
            assert_eq!(search("energy oil", &catalog), first);
        }
    }

    #[test]
    fn test_cancelled_search() {
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            search_cancellable("aapl", &catalog(), &token),
            Err(LensError::Cancelled)
        ));
    }

    #[test]
    fn test_engine_records_history() {
        let store = Arc::new(MemoryHistoryStore::new());
        let engine = SearchEngine::new(store.clone());
        let catalog = catalog();

        engine.search("  Tesla ", &catalog);
        engine.search("", &catalog);
        engine.search("apple", &catalog);

        assert_eq!(engine.history(), vec!["apple", "Tesla"]);
        assert_eq!(store.load().unwrap(), vec!["apple", "Tesla"]);
    }

    #[test]
    fn test_engine_cancelled_search_skips_history() {
        let engine = SearchEngine::new(Arc::new(MemoryHistoryStore::new()));
        let token = CancelToken::new();
        token.cancel();
        let result = engine.search_cancellable("apple", &catalog(), &token);
        assert!(result.is_err());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_engine_loads_existing_history() {
        let store = Arc::new(MemoryHistoryStore::with_entries(vec![
            "xom".to_string(),
            "aapl".to_string(),
        ]));
        let engine = SearchEngine::new(store);
        assert_eq!(engine.history(), vec!["xom", "aapl"]);

        engine.remove_history("XOM");
        assert_eq!(engine.history(), vec!["aapl"]);

        engine.clear_history();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_non_ascii_and_long_inputs_do_not_panic() {
        let long_text = "lorem ".repeat(5_000);
        let catalog = plain_catalog(vec![
            stock(
                "NTDOY",
                "任天堂 株式会社",
                &["ゲーム", "Ünïcode"],
                "Société générale",
            ),
            stock("IBM", "İbm Corporation", &["İbm"], &long_text),
        ]);

        let groups = search("ünïcode", &catalog);
        assert_eq!(groups[0].category, MatchCategory::StockTag);
        assert_eq!(symbols(&groups[0]), vec!["NTDOY"]);

        for query in ["日本", "İbm", "société", "ゲー ム"] {
            search(query, &catalog);
        }

        let long_keyword = "a".repeat(20_000);
        assert!(search(&long_keyword, &catalog).is_empty());
        assert!(search(&long_keyword, &self::catalog()).is_empty());
    }

    #[test]
    fn test_engine_unbounded_history_limit() {
        let engine =
            SearchEngine::with_limits(Arc::new(MemoryHistoryStore::new()), usize::MAX, 50);
        engine.search("oil", &catalog());
        assert_eq!(engine.history(), vec!["oil"]);
    }

    #[test]
    fn test_engine_find_similar_uses_configured_limit() {
        let stocks = (0..6)
            .map(|i| stock(&format!("BK{}", i), "Bank", &["Banks"], ""))
            .collect::<Vec<_>>();
        let comparisons = (0..6)
            .map(|i| (format!("BK{}", i), "+0.1%".to_string()))
            .collect();
        let catalog = CatalogIndex::build(
            stocks,
            vec![],
            TagWeightTable::new(),
            HashMap::new(),
            comparisons,
        );

        let engine = SearchEngine::with_limits(Arc::new(MemoryHistoryStore::new()), 10, 3);
        let related = engine.find_similar("BK0", &catalog).unwrap();
        assert_eq!(related.len(), 3);
        assert_eq!(related[0].symbol, "BK1");
    }
}
