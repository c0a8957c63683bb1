//! In-memory instrument catalog.
//!
//! The catalog is built once from the loader's stock and ETF lists plus the
//! externally supplied tag weights and market data maps. It holds no matching
//! logic; the scorer and similarity engine read it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::{LensError, LensResult};

/// Weight used for tags missing from the weight table.
pub const DEFAULT_TAG_WEIGHT: f64 = 1.0;

/// Kind of tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    #[default]
    Stock,
    Etf,
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKind::Stock => write!(f, "Stock"),
            InstrumentKind::Etf => write!(f, "ETF"),
        }
    }
}

/// One tradable symbol in the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentRecord {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description1: String,
    #[serde(default)]
    pub description2: String,
    #[serde(default)]
    pub kind: InstrumentKind,
}

impl InstrumentRecord {
    pub fn new(kind: InstrumentKind, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_descriptions(
        mut self,
        description1: impl Into<String>,
        description2: impl Into<String>,
    ) -> Self {
        self.description1 = description1.into();
        self.description2 = description2.into();
        self
    }

    /// Uppercased symbol, the key for every symbol-indexed map.
    pub fn symbol_key(&self) -> String {
        self.symbol.to_uppercase()
    }
}

/// Tag weights, grouped the way the weighting file stores them
/// (one weight shared by many tags) and inverted for lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagWeightTable {
    by_tag: HashMap<String, f64>,
}

impl TagWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(weight, tags)` groups.
    ///
    /// A tag listed under several weights keeps the highest one.
    pub fn from_groups<I, T, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (f64, T)>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (weight, tags) in groups {
            for tag in tags {
                table.insert(tag.as_ref(), weight);
            }
        }
        table
    }

    /// Add a tag weight. Non-finite weights are ignored.
    pub fn insert(&mut self, tag: &str, weight: f64) {
        if !weight.is_finite() {
            log::warn!("Ignoring non-finite weight for tag '{}'", tag);
            return;
        }
        let key = tag.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.by_tag
            .entry(key)
            .and_modify(|w| *w = w.max(weight))
            .or_insert(weight);
    }

    /// Resolve a tag's weight, defaulting to [`DEFAULT_TAG_WEIGHT`].
    pub fn weight(&self, tag: &str) -> f64 {
        self.by_tag
            .get(&tag.trim().to_lowercase())
            .copied()
            .unwrap_or(DEFAULT_TAG_WEIGHT)
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

impl<'de> Deserialize<'de> for TagWeightTable {
    /// Reads `{"2.0": ["EV", "Battery"], "1.5": [...]}`. Keys that do not
    /// parse as a number are skipped.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, Vec<String>> = HashMap::deserialize(deserializer)?;
        let mut table = TagWeightTable::new();
        for (key, tags) in raw {
            match key.trim().parse::<f64>() {
                Ok(weight) => {
                    for tag in &tags {
                        table.insert(tag, weight);
                    }
                }
                Err(_) => log::warn!("Skipping malformed tag weight key '{}'", key),
            }
        }
        Ok(table)
    }
}

/// Immutable catalog snapshot shared by search and similarity.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    records: Vec<InstrumentRecord>,
    by_symbol: HashMap<String, Vec<usize>>,
    tag_weights: TagWeightTable,
    market_caps: HashMap<String, f64>,
    comparisons: HashMap<String, String>,
}

/// Uppercase symbol keys.
///
/// Keys that collide after uppercasing resolve the same way regardless of
/// map order: a key already in uppercase wins, otherwise the smallest one.
pub(crate) fn uppercase_keys<V>(map: HashMap<String, V>) -> HashMap<String, V> {
    let mut entries: Vec<(String, V)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| {
        let a_canonical = *a == a.trim().to_uppercase();
        let b_canonical = *b == b.trim().to_uppercase();
        b_canonical.cmp(&a_canonical).then_with(|| a.cmp(b))
    });

    let mut keyed = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        keyed.entry(key.trim().to_uppercase()).or_insert(value);
    }
    keyed
}

impl CatalogIndex {
    /// Build the index. Records keep the order they were given in, stocks
    /// first, and take their kind from the list they came from.
    pub fn build(
        stocks: Vec<InstrumentRecord>,
        etfs: Vec<InstrumentRecord>,
        tag_weights: TagWeightTable,
        market_caps: HashMap<String, f64>,
        comparisons: HashMap<String, String>,
    ) -> Self {
        let tagged_stocks = stocks.into_iter().map(|mut r| {
            r.kind = InstrumentKind::Stock;
            r
        });
        let tagged_etfs = etfs.into_iter().map(|mut r| {
            r.kind = InstrumentKind::Etf;
            r
        });
        let records: Vec<InstrumentRecord> = tagged_stocks.chain(tagged_etfs).collect();

        let mut by_symbol: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_symbol.entry(record.symbol_key()).or_default().push(idx);
        }

        Self {
            records,
            by_symbol,
            tag_weights,
            market_caps: uppercase_keys(market_caps),
            comparisons: uppercase_keys(comparisons),
        }
    }

    /// All records, stocks first.
    pub fn records(&self) -> &[InstrumentRecord] {
        &self.records
    }

    /// Records of one kind, in catalog order.
    pub fn records_of(&self, kind: InstrumentKind) -> impl Iterator<Item = &InstrumentRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Every record with this symbol (case-insensitive), stocks first.
    pub fn lookup(&self, symbol: &str) -> Vec<&InstrumentRecord> {
        self.by_symbol
            .get(&symbol.trim().to_uppercase())
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    pub fn tag_weights(&self) -> &TagWeightTable {
        &self.tag_weights
    }

    pub fn market_cap(&self, symbol: &str) -> Option<f64> {
        self.market_caps.get(&symbol.trim().to_uppercase()).copied()
    }

    pub fn comparison(&self, symbol: &str) -> Option<&str> {
        self.comparisons
            .get(&symbol.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Handle to the current catalog snapshot.
///
/// Starts empty; readers get [`LensError::CatalogUnavailable`] until the
/// loader installs a catalog.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Option<Arc<CatalogIndex>>>>,
}

impl SharedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot. In-flight readers keep the old one.
    pub fn install(&self, index: CatalogIndex) {
        log::info!("Installing catalog with {} instruments", index.len());
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Arc::new(index));
    }

    pub fn clear(&self) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_ok()
    }

    /// Get the current snapshot.
    pub fn snapshot(&self) -> LensResult<Arc<CatalogIndex>> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone().ok_or(LensError::CatalogUnavailable)
    }
}
