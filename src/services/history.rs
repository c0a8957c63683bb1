//! Search history module for tracking recent free-text queries

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Mutex;

use crate::error::LensResult;

/// Number of queries kept by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Where history is persisted between runs.
///
/// The engine loads once at startup and saves after every change.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> LensResult<Vec<String>>;
    fn save(&self, entries: &[String]) -> LensResult<()>;
}

/// In-memory store, for tests and hosts that persist history themselves.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> LensResult<Vec<String>> {
        let guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }

    fn save(&self, entries: &[String]) -> LensResult<()> {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = entries.to_vec();
        Ok(())
    }
}

/// Bounded, case-insensitively deduplicated query history
#[derive(Debug, Clone)]
pub struct SearchHistory {
    items: Vec<String>,
    max_items: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SearchHistory {
    /// Create an empty history with max items limit
    pub fn new(max_items: usize) -> Self {
        Self {
            items: Vec::new(),
            max_items: max_items.max(1),
        }
    }

    /// Load persisted entries, oldest last. A store that fails to load
    /// leaves the history empty.
    pub fn load_from(store: &dyn HistoryStore, max_items: usize) -> Self {
        let mut history = Self::new(max_items);
        match store.load() {
            Ok(entries) => {
                // Replay oldest first so the newest ends up in front
                for entry in entries.iter().rev() {
                    history.record(entry);
                }
            }
            Err(e) => log::warn!("Failed to load search history: {}", e),
        }
        history
    }

    /// Put a query at the front. Returns false for blank queries.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }

        // Remove if already exists (move to front, newest casing wins)
        let lowered = query.to_lowercase();
        self.items.retain(|item| item.to_lowercase() != lowered);

        self.items.insert(0, query.to_string());
        self.items.truncate(self.max_items);
        true
    }

    /// Remove a query, ignoring case. Returns whether anything was removed.
    pub fn remove(&mut self, query: &str) -> bool {
        let lowered = query.trim().to_lowercase();
        let before = self.items.len();
        self.items.retain(|item| item.to_lowercase() != lowered);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Get all queries (most recent first)
    pub fn list(&self) -> &[String] {
        &self.items
    }

    /// Rank past queries against a partially typed one.
    ///
    /// Prefix matches are boosted above other fuzzy matches; an empty
    /// partial returns the most recent entries.
    pub fn suggestions(&self, partial: &str, max_results: usize) -> Vec<String> {
        let partial = partial.trim().to_lowercase();
        if partial.is_empty() {
            return self.items.iter().take(max_results).cloned().collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, usize, &String)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(recency, item)| {
                let lowered = item.to_lowercase();
                let score = matcher.fuzzy_match(&lowered, &partial)?;
                let boost = if lowered.starts_with(&partial) { 100 } else { 0 };
                Some((score + boost, recency, item))
            })
            .collect();

        // Best score first, more recent first on ties
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(max_results)
            .map(|(_, _, item)| item.clone())
            .collect()
    }

    /// Number of queries in history
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
