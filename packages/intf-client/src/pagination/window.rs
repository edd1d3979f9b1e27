//! Fixed window of concurrent page fetches, delivered in page order.

use super::{Completion, PageRequest, PageSource, Progress, RunReport};
use crate::records::Record;
use crate::Error;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) async fn run<S, F>(
    source: Arc<S>,
    page_size: usize,
    window: usize,
    cancel: &CancellationToken,
    sink: &mut F,
) -> Result<RunReport, Error>
where
    S: PageSource,
    F: FnMut(u32, Vec<Record>) -> ControlFlow<()>,
{
    let window = window.max(1) as u32;
    let mut progress = Progress::default();
    let mut first = 1u32;

    loop {
        if cancel.is_cancelled() {
            return Ok(progress.finish(Completion::Interrupted));
        }

        let last = first + window - 1;
        debug!(first, last, "Dispatching window");
        let mut set = JoinSet::new();
        for page in first..=last {
            let source = Arc::clone(&source);
            set.spawn(async move {
                let result = source.fetch_page(PageRequest { page, limit: page_size }).await;
                (page, result)
            });
        }

        let mut results: BTreeMap<u32, Result<Vec<Record>, Error>> = BTreeMap::new();
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    set.abort_all();
                    return Ok(progress.finish(Completion::Interrupted));
                }
                j = set.join_next() => j,
            };
            match joined {
                Some(Ok((page, result))) => {
                    results.insert(page, result);
                }
                Some(Err(e)) => warn!(error = %e, "Page task did not complete"),
                None => break,
            }
        }
        if cancel.is_cancelled() {
            return Ok(progress.finish(Completion::Interrupted));
        }

        for page in first..=last {
            let result = results.remove(&page).unwrap_or_else(|| {
                Err(Error::Transport(format!("page {page} task did not complete")))
            });
            let records = match result {
                Ok(records) => records,
                Err(e) => {
                    warn!(page, error = %e, "Page fetch failed");
                    return progress.fail(page, e);
                }
            };
            progress.pages_fetched += 1;

            let count = records.len();
            if count == 0 {
                info!(page, "No more records");
                return Ok(progress.finish(Completion::Exhausted));
            }
            progress.records_seen += count;
            info!(page, count, total = progress.records_seen, "Page fetched");

            if sink(page, records).is_break() {
                return Ok(progress.finish(Completion::Stopped));
            }
            if count < page_size {
                info!(page, count, "Last page reached");
                return Ok(progress.finish(Completion::Exhausted));
            }
        }
        first = last + 1;
    }
}
