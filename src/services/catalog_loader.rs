//! Catalog bundle loading.
//!
//! A bundle is one JSON file carrying everything the engine needs: the stock
//! and ETF lists, the tag weight table and a market data snapshot.
//!
//! ```json
//! {
//!   "stocks": [{"symbol": "XOM", "name": "Exxon Mobil", "tags": ["Energy"]}],
//!   "etfs": [],
//!   "tagWeights": {"2.0": ["Energy"]},
//!   "marketData": {"XOM": {"marketCap": 4.6e11, "comparison": "+0.3%"}}
//! }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::market_data::MarketSnapshot;
use crate::core::catalog::{CatalogIndex, InstrumentRecord, TagWeightTable};
use crate::error::{LensError, LensResult};

/// Parsed catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogBundle {
    pub stocks: Vec<InstrumentRecord>,
    pub etfs: Vec<InstrumentRecord>,
    pub tag_weights: TagWeightTable,
    pub market_data: MarketSnapshot,
}

impl CatalogBundle {
    /// Parse a bundle from JSON text.
    pub fn from_json(contents: &str) -> LensResult<Self> {
        let bundle: CatalogBundle = serde_json::from_str(contents)?;
        Ok(bundle)
    }

    /// Build the catalog index, keeping the snapshot for enrichment.
    pub fn into_index(self) -> (CatalogIndex, MarketSnapshot) {
        let index = CatalogIndex::build(
            self.stocks,
            self.etfs,
            self.tag_weights,
            self.market_data.market_caps(),
            self.market_data.comparisons(),
        );
        (index, self.market_data)
    }
}

/// Read and parse a bundle file.
pub fn load_bundle(path: &Path) -> LensResult<CatalogBundle> {
    if !path.exists() {
        return Err(LensError::Config(format!(
            "Catalog file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)?;
    let bundle = CatalogBundle::from_json(&contents)?;
    log::info!(
        "Loaded {} stocks and {} ETFs from {}",
        bundle.stocks.len(),
        bundle.etfs.len(),
        path.display()
    );
    Ok(bundle)
}
