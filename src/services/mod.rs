//! Stateful collaborators around the pure engine: history, persisted state,
//! market data, catalog loading and the worker pool.

pub mod catalog_loader;
pub mod history;
pub mod market_data;
pub mod storage;
pub mod worker;

pub use catalog_loader::{load_bundle, CatalogBundle};
pub use history::{HistoryStore, MemoryHistoryStore, SearchHistory, DEFAULT_HISTORY_LIMIT};
pub use market_data::{EnrichedResult, MarketQuote, MarketSnapshot};
pub use storage::StateStore;
pub use worker::{RequestId, SearchWorker, Ticket, WorkerOutcome, WorkerResponse};
