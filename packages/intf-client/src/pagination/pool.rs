//! Worker pool: N tasks pull page requests from a shared queue.
//!
//! The orchestrator dispatches batches of `2 * workers` pages over an
//! estimated range and keeps extending the range while pages return data.

use super::{Completion, PageRequest, PageSource, Progress, RunReport};
use crate::records::Record;
use crate::Error;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pages assumed to exist before any data has been seen.
pub const INITIAL_ESTIMATED_PAGES: u32 = 200;
/// Range extension when a batch near the estimate still returned data.
pub const ESTIMATE_EXTENSION: u32 = 100;
/// Consecutive batches without data before giving up.
pub const MAX_EMPTY_BATCHES: u32 = 3;

/// What one worker made of one page.
#[derive(Debug)]
pub enum PageOutcome {
    Records(Vec<Record>),
    Empty,
    Failed(Error),
}

#[derive(Debug)]
pub struct PageResult {
    pub page: u32,
    pub outcome: PageOutcome,
}

/// Fixed set of fetch tasks sharing one source (and its HTTP client).
///
/// Dropping the pool aborts every worker, so in-flight requests are
/// discarded on early exit.
pub struct WorkerPool {
    tasks: flume::Sender<PageRequest>,
    results: flume::Receiver<PageResult>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn<S: PageSource>(source: Arc<S>, workers: usize) -> Self {
        let (task_tx, task_rx) = flume::unbounded::<PageRequest>();
        let (result_tx, result_rx) = flume::unbounded::<PageResult>();

        let handles = (0..workers.max(1))
            .map(|id| {
                let tasks = task_rx.clone();
                let results = result_tx.clone();
                let source = Arc::clone(&source);
                tokio::spawn(async move {
                    while let Ok(request) = tasks.recv_async().await {
                        let outcome = match source.fetch_page(request).await {
                            Ok(records) if records.is_empty() => PageOutcome::Empty,
                            Ok(records) => PageOutcome::Records(records),
                            Err(e) => PageOutcome::Failed(e),
                        };
                        let result = PageResult { page: request.page, outcome };
                        if results.send_async(result).await.is_err() {
                            break;
                        }
                    }
                    debug!(worker = id, "Worker exiting");
                })
            })
            .collect();

        Self {
            tasks: task_tx,
            results: result_rx,
            workers: handles,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn submit(&self, request: PageRequest) -> Result<(), Error> {
        self.tasks
            .send(request)
            .map_err(|_| Error::Transport("worker pool is closed".into()))
    }

    /// Next finished page, in completion order.
    pub async fn next_result(&self) -> Option<PageResult> {
        self.results.recv_async().await.ok()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for handle in &self.workers {
            handle.abort();
        }
    }
}

pub(crate) async fn run<S, F>(
    source: Arc<S>,
    page_size: usize,
    workers: usize,
    cancel: &CancellationToken,
    sink: &mut F,
) -> Result<RunReport, Error>
where
    S: PageSource,
    F: FnMut(u32, Vec<Record>) -> ControlFlow<()>,
{
    let pool = WorkerPool::spawn(source, workers);
    let batch_size = (pool.size() * 2) as u32;
    let mut progress = Progress::default();
    let mut estimated = INITIAL_ESTIMATED_PAGES;
    let mut empty_batches = 0u32;
    let mut page = 1u32;

    info!(workers = pool.size(), batch_size, estimated, "Starting worker pool");

    while page <= estimated && empty_batches < MAX_EMPTY_BATCHES {
        if cancel.is_cancelled() {
            return Ok(progress.finish(Completion::Interrupted));
        }

        let batch_end = (page + batch_size - 1).min(estimated);
        for p in page..=batch_end {
            pool.submit(PageRequest { page: p, limit: page_size })?;
        }
        debug!(first = page, last = batch_end, "Dispatched batch");

        let expected = batch_end - page + 1;
        let mut received = 0u32;
        let mut batch_had_data = false;
        let mut reached_end = false;
        let mut failure: Option<(u32, Error)> = None;

        while received < expected {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(progress.finish(Completion::Interrupted)),
                r = pool.next_result() => r,
            };
            let Some(PageResult { page: p, outcome }) = next else {
                return progress.fail(page, Error::Transport("worker pool closed".into()));
            };
            received += 1;

            match outcome {
                PageOutcome::Records(records) => {
                    let count = records.len();
                    progress.pages_fetched += 1;
                    progress.records_seen += count;
                    batch_had_data = true;
                    if count < page_size {
                        reached_end = true;
                    }
                    info!(page = p, count, total = progress.records_seen, "Page fetched");
                    if sink(p, records).is_break() {
                        return Ok(progress.finish(Completion::Stopped));
                    }
                }
                PageOutcome::Empty => {
                    progress.pages_fetched += 1;
                    reached_end = true;
                    debug!(page = p, "No data on page");
                }
                PageOutcome::Failed(e) => {
                    warn!(page = p, error = %e, "Page fetch failed");
                    if failure.as_ref().map_or(true, |(fp, _)| p < *fp) {
                        failure = Some((p, e));
                    }
                }
            }
        }

        if let Some((p, e)) = failure {
            return progress.fail(p, e);
        }
        if reached_end {
            info!(last = batch_end, "End of data reached");
            return Ok(progress.finish(Completion::Exhausted));
        }

        if batch_had_data {
            empty_batches = 0;
            if batch_end + batch_size > estimated {
                estimated += ESTIMATE_EXTENSION;
                info!(estimated, "Extending estimated page range");
            }
        } else {
            empty_batches += 1;
        }
        page = batch_end + 1;
    }

    Ok(progress.finish(Completion::Exhausted))
}
