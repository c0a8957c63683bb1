//! Background worker pool for search requests.
//!
//! Searches are pure and cheap enough to run synchronously, but a UI thread
//! should never wait on them. The pool runs requests on plain threads that
//! share one job channel and answers on a response channel. Responses can
//! arrive in any order, so every request carries an id the caller uses to
//! match answers to questions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Config;
use crate::core::catalog::{CatalogIndex, SharedCatalog};
use crate::core::search::{CancelToken, GroupedResult, SearchEngine};
use crate::core::similarity::RelatedInstrument;
use crate::error::{LensError, LensResult};

/// Identifies one submitted request.
pub type RequestId = u64;

enum Job {
    Search {
        id: RequestId,
        query: String,
        cancel: CancelToken,
    },
    Similar {
        id: RequestId,
        symbol: String,
        cancel: CancelToken,
    },
}

/// Result of a finished request.
#[derive(Debug)]
pub enum WorkerOutcome {
    Search(LensResult<Vec<GroupedResult>>),
    Similar(LensResult<Vec<RelatedInstrument>>),
}

impl WorkerOutcome {
    pub fn error(&self) -> Option<&LensError> {
        match self {
            WorkerOutcome::Search(result) => result.as_ref().err(),
            WorkerOutcome::Similar(result) => result.as_ref().err(),
        }
    }
}

/// Answer to a submitted request.
#[derive(Debug)]
pub struct WorkerResponse {
    pub id: RequestId,
    pub outcome: WorkerOutcome,
}

/// Handle for a submitted request.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: RequestId,
    cancel: CancelToken,
}

impl Ticket {
    /// Ask the worker to drop this request. A request that already finished
    /// is unaffected.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Pool of search threads.
pub struct SearchWorker {
    jobs: Option<Sender<Job>>,
    responses: Receiver<WorkerResponse>,
    handles: Vec<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl SearchWorker {
    /// Start `threads` worker threads (at least one).
    pub fn spawn(
        engine: SearchEngine,
        catalog: SharedCatalog,
        threads: usize,
    ) -> LensResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (response_tx, response_rx) = mpsc::channel();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut handles = Vec::new();
        for n in 0..threads.max(1) {
            let engine = engine.clone();
            let catalog = catalog.clone();
            let job_rx = Arc::clone(&job_rx);
            let response_tx = response_tx.clone();

            let handle = thread::Builder::new()
                .name(format!("tickerlens-worker-{}", n))
                .spawn(move || worker_loop(engine, catalog, job_rx, response_tx))?;
            handles.push(handle);
        }

        log::debug!("Started {} search worker threads", handles.len());
        Ok(Self {
            jobs: Some(job_tx),
            responses: response_rx,
            handles,
            next_id: AtomicU64::new(1),
        })
    }

    /// Start the pool with the configured number of threads.
    pub fn from_config(
        engine: SearchEngine,
        catalog: SharedCatalog,
        config: &Config,
    ) -> LensResult<Self> {
        Self::spawn(engine, catalog, config.worker.threads)
    }

    /// Block until the answer to request `id` arrives. Answers to other
    /// requests that arrive first are dropped.
    pub fn wait_for(&self, id: RequestId, timeout: Duration) -> LensResult<WorkerOutcome> {
        loop {
            match self.recv_timeout(timeout)? {
                Some(response) if response.id == id => return Ok(response.outcome),
                Some(response) => log::debug!("Dropping stale response {}", response.id),
                None => return Err(LensError::Timeout),
            }
        }
    }

    /// Queue a free-text search.
    pub fn submit_search(&self, query: &str) -> LensResult<Ticket> {
        self.submit_search_with(query, CancelToken::new())
    }

    /// Queue a free-text search observing an existing cancel token.
    pub fn submit_search_with(&self, query: &str, cancel: CancelToken) -> LensResult<Ticket> {
        let id = self.next_id();
        self.send(Job::Search {
            id,
            query: query.to_string(),
            cancel: cancel.clone(),
        })?;
        Ok(Ticket { id, cancel })
    }

    /// Queue a similarity lookup.
    pub fn submit_similar(&self, symbol: &str) -> LensResult<Ticket> {
        self.submit_similar_with(symbol, CancelToken::new())
    }

    pub fn submit_similar_with(&self, symbol: &str, cancel: CancelToken) -> LensResult<Ticket> {
        let id = self.next_id();
        self.send(Job::Similar {
            id,
            symbol: symbol.to_string(),
            cancel: cancel.clone(),
        })?;
        Ok(Ticket { id, cancel })
    }

    /// Channel of finished requests.
    pub fn responses(&self) -> &Receiver<WorkerResponse> {
        &self.responses
    }

    /// Wait for the next finished request.
    pub fn recv_timeout(&self, timeout: Duration) -> LensResult<Option<WorkerResponse>> {
        match self.responses.recv_timeout(timeout) {
            Ok(response) => Ok(Some(response)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LensError::WorkerStopped),
        }
    }

    /// Stop accepting work and join all threads. Queued jobs still run.
    pub fn shutdown(&mut self) {
        // Closing the job channel ends every worker loop
        self.jobs.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("Search worker thread panicked");
            }
        }
    }

    fn next_id(&self) -> RequestId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn send(&self, job: Job) -> LensResult<()> {
        let jobs = self.jobs.as_ref().ok_or(LensError::WorkerStopped)?;
        jobs.send(job).map_err(|_| LensError::WorkerStopped)
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The main worker loop (runs in background thread).
fn worker_loop(
    engine: SearchEngine,
    catalog: SharedCatalog,
    jobs: Arc<Mutex<Receiver<Job>>>,
    responses: Sender<WorkerResponse>,
) {
    loop {
        let job = {
            let Ok(guard) = jobs.lock() else {
                return;
            };
            match guard.recv() {
                Ok(job) => job,
                Err(_) => return,
            }
        };

        let response = run_job(&engine, &catalog, job);
        if let Some(e) = response.outcome.error() {
            if !e.is_recoverable() {
                log::warn!("Request {} failed: {}", response.id, e);
            }
        }
        // Receiver gone means nobody is listening anymore
        if responses.send(response).is_err() {
            return;
        }
    }
}

fn run_job(engine: &SearchEngine, catalog: &SharedCatalog, job: Job) -> WorkerResponse {
    match job {
        Job::Search { id, query, cancel } => {
            let outcome = checked(&cancel, catalog)
                .and_then(|snapshot| engine.search_cancellable(&query, &snapshot, &cancel));
            WorkerResponse {
                id,
                outcome: WorkerOutcome::Search(outcome),
            }
        }
        Job::Similar { id, symbol, cancel } => {
            let outcome = checked(&cancel, catalog)
                .and_then(|snapshot| engine.find_similar(&symbol, &snapshot));
            WorkerResponse {
                id,
                outcome: WorkerOutcome::Similar(outcome),
            }
        }
    }
}

fn checked(cancel: &CancelToken, catalog: &SharedCatalog) -> LensResult<Arc<CatalogIndex>> {
    if cancel.is_cancelled() {
        return Err(LensError::Cancelled);
    }
    catalog.snapshot()
}
