//! Market data snapshot and result enrichment.
//!
//! Prices, caps and volumes come from an external quote service. The host
//! resolves them into a [`MarketSnapshot`] before calling into the engine;
//! nothing here fetches anything.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::catalog::uppercase_keys;
use crate::core::search::ScoredResult;

/// Quote fields for one symbol. Any of them may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// Daily change, preformatted (e.g. "+1.25%").
    #[serde(default)]
    pub comparison: Option<String>,
    #[serde(default)]
    pub volume: Option<i64>,
}

/// Quotes keyed by uppercased symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, MarketQuote>",
    into = "HashMap<String, MarketQuote>"
)]
pub struct MarketSnapshot {
    quotes: HashMap<String, MarketQuote>,
}

impl From<HashMap<String, MarketQuote>> for MarketSnapshot {
    fn from(raw: HashMap<String, MarketQuote>) -> Self {
        Self {
            quotes: uppercase_keys(raw),
        }
    }
}

impl From<MarketSnapshot> for HashMap<String, MarketQuote> {
    fn from(snapshot: MarketSnapshot) -> Self {
        snapshot.quotes
    }
}

/// A search hit with its market data attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult {
    #[serde(flatten)]
    pub result: ScoredResult,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub comparison: Option<String>,
    pub volume: Option<i64>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, quote: MarketQuote) {
        self.quotes.insert(symbol.trim().to_uppercase(), quote);
    }

    pub fn quote(&self, symbol: &str) -> Option<&MarketQuote> {
        self.quotes.get(&symbol.trim().to_uppercase())
    }

    /// Symbol -> market cap, for building the catalog index.
    pub fn market_caps(&self) -> HashMap<String, f64> {
        self.quotes
            .iter()
            .filter_map(|(symbol, q)| Some((symbol.to_uppercase(), q.market_cap?)))
            .collect()
    }

    /// Symbol -> daily comparison string, for building the catalog index.
    pub fn comparisons(&self) -> HashMap<String, String> {
        self.quotes
            .iter()
            .filter_map(|(symbol, q)| Some((symbol.to_uppercase(), q.comparison.clone()?)))
            .collect()
    }

    /// Attach quote data to search hits. Unknown symbols get empty fields.
    pub fn enrich(&self, results: &[ScoredResult]) -> Vec<EnrichedResult> {
        results
            .iter()
            .map(|result| {
                let quote = self.quote(&result.record.symbol).cloned().unwrap_or_default();
                EnrichedResult {
                    result: result.clone(),
                    market_cap: quote.market_cap,
                    pe_ratio: quote.pe_ratio,
                    comparison: quote.comparison,
                    volume: quote.volume,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Compact market cap label ("2.95T", "840.10B", "12.00M").
pub fn format_market_cap(cap: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];
    for (scale, suffix) in UNITS {
        if cap.abs() >= scale {
            return format!("{:.2}{}", cap / scale, suffix);
        }
    }
    format!("{:.0}", cap)
}
