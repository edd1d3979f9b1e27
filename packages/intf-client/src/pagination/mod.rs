//! Paginated fetch with three execution strategies.
//!
//! Every strategy honours the same termination rule: a page with fewer
//! records than requested (or none) is the last one. Records are handed to a
//! caller-owned sink; the sink can stop the run early. Cancellation is
//! cooperative at page and batch boundaries.

mod pool;
mod sequential;
mod window;

pub use pool::{PageOutcome, PageResult, WorkerPool};

use crate::records::Record;
use crate::Error;
use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One page to fetch. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: usize,
}

/// Anything that can produce the records of one page.
pub trait PageSource: Send + Sync + 'static {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Vec<Record>, Error>> + Send;
}

/// How pages are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One page at a time, in order.
    Sequential,
    /// Up to `window` pages in flight, delivered in page order.
    Windowed { window: usize },
    /// `workers` tasks fed from a queue, range extended while data keeps coming.
    Pool { workers: usize },
}

impl Strategy {
    /// Build from a strategy name plus the sizing knobs from settings.
    pub fn from_name(name: &str, window: usize, workers: usize) -> Result<Self, Error> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Strategy::Sequential),
            "windowed" | "window" | "async" => Ok(Strategy::Windowed { window: window.max(1) }),
            "pool" | "parallel" => Ok(Strategy::Pool { workers: workers.max(1) }),
            other => Err(Error::Config(format!(
                "Unknown strategy '{other}'. Use sequential, windowed, or pool."
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Windowed { window } => write!(f, "windowed({window})"),
            Strategy::Pool { workers } => write!(f, "pool({workers})"),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::from_name(s, crate::config::DEFAULT_WINDOW, crate::config::default_workers())
    }
}

/// Why a run ended.
#[derive(Debug, Clone)]
pub enum Completion {
    /// Short or empty page reached.
    Exhausted,
    /// The sink asked to stop.
    Stopped,
    /// Cancelled; everything delivered so far is kept.
    Interrupted,
    /// A page failed after some records were already delivered.
    Partial { page: u32, error: Error },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub completion: Completion,
    /// Pages whose result was consumed (empty end-of-data pages included).
    pub pages_fetched: u32,
    /// Records handed to the sink.
    pub records_seen: usize,
}

impl RunReport {
    pub fn is_interrupted(&self) -> bool {
        matches!(self.completion, Completion::Interrupted)
    }
}

/// Running totals shared by the strategies.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    pub(crate) pages_fetched: u32,
    pub(crate) records_seen: usize,
}

impl Progress {
    pub(crate) fn finish(self, completion: Completion) -> RunReport {
        RunReport {
            completion,
            pages_fetched: self.pages_fetched,
            records_seen: self.records_seen,
        }
    }

    /// Abort when nothing was delivered yet, otherwise keep the partial result.
    pub(crate) fn fail(self, page: u32, error: Error) -> Result<RunReport, Error> {
        if self.records_seen == 0 {
            Err(error)
        } else {
            Ok(self.finish(Completion::Partial { page, error }))
        }
    }
}

/// Fetch pages from `source` until the data runs out, the sink stops, a page
/// fails, or `cancel` fires.
///
/// Returns `Err` only when the first failure happens before any record was
/// delivered.
pub async fn paginate<S, F>(
    source: Arc<S>,
    strategy: Strategy,
    page_size: usize,
    cancel: &CancellationToken,
    mut sink: F,
) -> Result<RunReport, Error>
where
    S: PageSource,
    F: FnMut(u32, Vec<Record>) -> ControlFlow<()>,
{
    if page_size == 0 {
        return Err(Error::Config("page size must be at least 1".into()));
    }
    match strategy {
        Strategy::Sequential => sequential::run(&*source, page_size, cancel, &mut sink).await,
        Strategy::Windowed { window } => {
            window::run(source, page_size, window, cancel, &mut sink).await
        }
        Strategy::Pool { workers } => {
            pool::run(source, page_size, workers, cancel, &mut sink).await
        }
    }
}

// --- Test helpers (shared across sub-module tests) ---
