//! tickerlens - symbol search and similarity ranking for stocks and ETFs.
//!
//! Free-text queries are matched against symbols, names, tags and
//! descriptions and returned as ranked category groups. A second engine
//! recommends instruments that share weighted tags with a target symbol.
//!
//! # Architecture
//!
//! The library is organized into these main modules:
//!
//! - [`config`] - Configuration loading and management
//! - [`core`] - Catalog index, scoring, search and similarity (no I/O)
//! - [`services`] - History, persisted state, market data, catalog loading
//!   and the background worker pool
//! - [`cli`] - Command-line front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tickerlens::services::{load_bundle, MemoryHistoryStore};
//! use tickerlens::SearchEngine;
//!
//! let bundle = load_bundle("catalog.json".as_ref()).unwrap();
//! let (index, _market) = bundle.into_index();
//! let engine = SearchEngine::new(Arc::new(MemoryHistoryStore::new()));
//!
//! for group in engine.search("electric vehicles", &index) {
//!     println!("{}: {} hits", group.category, group.results.len());
//! }
//! ```

// Public modules
pub mod cli;
pub mod config;
pub mod core;
pub mod services;

// Internal modules
mod error;

// Re-export commonly used types for convenience
pub use config::Config;
pub use core::catalog::{CatalogIndex, InstrumentKind, InstrumentRecord, SharedCatalog};
pub use core::search::{GroupedResult, ScoredResult, SearchEngine};
pub use core::similarity::RelatedInstrument;
pub use error::{LensError, LensResult};
