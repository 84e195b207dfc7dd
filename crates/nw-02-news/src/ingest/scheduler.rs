//! # Ingestion Scheduler
//!
//! ```text
//! worker (url, rubric) ──┐
//! worker (url, rubric) ──┼──→ mpsc ──→ sink (single writer) ──→ NewsStore
//! worker (url, rubric) ──┘
//! ```
//!
//! Each worker loops fetch → normalize → push → sleep. A failed fetch is
//! logged and the loop carries on after the same fixed sleep. Duplicate links
//! are dropped by the store and only counted.

use crate::domain::FeedSource;
use crate::ports::{FeedFetcher, NewsStore};
use shared_types::NewsItem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Batches buffered between the workers and the sink.
pub const SINK_CAPACITY: usize = 64;

/// Counters across all workers and the sink.
#[derive(Debug, Default)]
pub struct IngestStats {
    pub fetches: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub inserted: AtomicU64,
    pub duplicates: AtomicU64,
    pub store_failures: AtomicU64,
}

impl IngestStats {
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Items from one successful fetch.
struct FeedBatch {
    url: String,
    items: Vec<NewsItem>,
}

pub struct IngestionScheduler {
    sources: Vec<FeedSource>,
    interval: Duration,
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn NewsStore>,
    stats: Arc<IngestStats>,
}

/// Running scheduler tasks.
pub struct IngestionHandle {
    workers: Vec<JoinHandle<()>>,
    sink: JoinHandle<()>,
    stats: Arc<IngestStats>,
}

impl IngestionHandle {
    pub fn stats(&self) -> Arc<IngestStats> {
        Arc::clone(&self.stats)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker, then the sink, to finish.
    pub async fn join(self) {
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Feed worker ended abnormally");
            }
        }
        if let Err(e) = self.sink.await {
            error!(error = %e, "Feed sink ended abnormally");
        }
    }
}

impl IngestionScheduler {
    pub fn new(
        sources: Vec<FeedSource>,
        interval: Duration,
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<dyn NewsStore>,
    ) -> Self {
        Self {
            sources,
            interval,
            fetcher,
            store,
            stats: Arc::new(IngestStats::default()),
        }
    }

    /// Spawn one worker per source and the sink.
    ///
    /// Workers stop on the shutdown signal; the sink stops once every worker
    /// has dropped its sender.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> IngestionHandle {
        let (tx, rx) = mpsc::channel(SINK_CAPACITY);

        info!(
            sources = self.sources.len(),
            interval_secs = self.interval.as_secs(),
            "Starting ingestion scheduler"
        );

        let workers = self
            .sources
            .into_iter()
            .map(|source| {
                let worker = FeedWorker {
                    source,
                    interval: self.interval,
                    fetcher: Arc::clone(&self.fetcher),
                    sink: tx.clone(),
                    stats: Arc::clone(&self.stats),
                };
                tokio::spawn(worker.run(shutdown.clone()))
            })
            .collect();
        drop(tx);

        let sink = tokio::spawn(run_sink(
            Arc::clone(&self.store),
            rx,
            Arc::clone(&self.stats),
        ));

        IngestionHandle {
            workers,
            sink,
            stats: self.stats,
        }
    }
}

struct FeedWorker {
    source: FeedSource,
    interval: Duration,
    fetcher: Arc<dyn FeedFetcher>,
    sink: mpsc::Sender<FeedBatch>,
    stats: Arc<IngestStats>,
}

impl FeedWorker {
    #[instrument(skip_all, name = "feed_worker", fields(url = %self.source.url, rubric = %self.source.rubric))]
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        debug!("Feed worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            IngestStats::add(&self.stats.fetches, 1);
            let fetched = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                fetched = self.fetcher.fetch(&self.source) => fetched,
            };

            match fetched {
                Ok(items) => {
                    debug!(items = items.len(), "Feed fetched");
                    let batch = FeedBatch {
                        url: self.source.url.clone(),
                        items,
                    };
                    if self.sink.send(batch).await.is_err() {
                        warn!("Feed sink closed, stopping worker");
                        break;
                    }
                }
                Err(e) => {
                    IngestStats::add(&self.stats.fetch_failures, 1);
                    warn!(error = %e, "Feed fetch failed");
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => {}
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        debug!("Feed worker stopped");
    }
}

/// Single writer: applies every batch to the store in arrival order.
async fn run_sink(
    store: Arc<dyn NewsStore>,
    mut batches: mpsc::Receiver<FeedBatch>,
    stats: Arc<IngestStats>,
) {
    while let Some(batch) = batches.recv().await {
        let received = batch.items.len();
        match store.append(batch.items) {
            Ok(outcome) => {
                IngestStats::add(&stats.inserted, outcome.inserted as u64);
                IngestStats::add(&stats.duplicates, outcome.duplicates as u64);
                if outcome.inserted > 0 {
                    info!(
                        url = %batch.url,
                        inserted = outcome.inserted,
                        duplicates = outcome.duplicates,
                        "News stored"
                    );
                }
            }
            Err(e) => {
                IngestStats::add(&stats.store_failures, 1);
                error!(url = %batch.url, items = received, error = %e, "Failed to store news");
            }
        }
    }
    info!("Feed sink stopped");
}
