//! One page at a time, in page order.

use super::{Completion, PageRequest, PageSource, Progress, RunReport};
use crate::records::Record;
use crate::Error;
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) async fn run<S, F>(
    source: &S,
    page_size: usize,
    cancel: &CancellationToken,
    sink: &mut F,
) -> Result<RunReport, Error>
where
    S: PageSource,
    F: FnMut(u32, Vec<Record>) -> ControlFlow<()>,
{
    let mut progress = Progress::default();
    let mut page = 1u32;

    loop {
        if cancel.is_cancelled() {
            return Ok(progress.finish(Completion::Interrupted));
        }

        debug!(page, limit = page_size, "Fetching page");
        let request = PageRequest { page, limit: page_size };
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(progress.finish(Completion::Interrupted)),
            r = source.fetch_page(request) => r,
        };
        // A page that lands together with the cancel is not kept.
        if cancel.is_cancelled() {
            return Ok(progress.finish(Completion::Interrupted));
        }

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
        page += 1;
    }
}
