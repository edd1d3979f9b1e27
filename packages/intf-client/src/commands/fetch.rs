//! `intf fetch <SYSTEM>`: page through every user and save them.

use super::{client_for, Outcome};
use crate::config::{Settings, FETCH_PAGE_SIZE};
use crate::endpoint::{Endpoint, System};
use crate::output::{default_users_path, save_json};
use crate::pagination::{paginate, Completion, PageSource, RunReport, Strategy};
use crate::records::Record;
use crate::report::log_stats;
use crate::Error;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub system: System,
    pub output: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub strategy: Option<String>,
}

/// Every record, in page order regardless of strategy.
pub async fn fetch_all<S: PageSource>(
    source: Arc<S>,
    strategy: Strategy,
    page_size: usize,
    cancel: &CancellationToken,
) -> Result<(Vec<Record>, RunReport), Error> {
    let mut pages: BTreeMap<u32, Vec<Record>> = BTreeMap::new();
    let report = paginate(source, strategy, page_size, cancel, |page, records| {
        pages.insert(page, records);
        ControlFlow::Continue(())
    })
    .await?;
    Ok((pages.into_values().flatten().collect(), report))
}

pub async fn run(
    settings: &Settings,
    args: FetchArgs,
    cancel: &CancellationToken,
) -> Result<Outcome, Error> {
    let endpoint = Endpoint::users(args.system, settings.tenant_id())?;
    let client = Arc::new(client_for(settings, endpoint)?);
    let strategy = settings.strategy(args.strategy.as_deref())?;
    let page_size = args.page_size.unwrap_or(settings.page_size_or(FETCH_PAGE_SIZE));
    let path = args.output.unwrap_or_else(|| default_users_path(args.system));

    info!(
        system = %args.system,
        url = %client.endpoint().url(&client.endpoint().path),
        %strategy,
        page_size,
        "Fetching all users"
    );

    let (records, report) = fetch_all(Arc::clone(&client), strategy, page_size, cancel).await?;
    log_stats(&client.stats().snapshot());

    let outcome = match &report.completion {
        Completion::Interrupted => {
            if records.is_empty() {
                warn!(path = %path.display(), "Interrupted before any data arrived, nothing saved");
                return Ok(Outcome::Interrupted);
            }
            warn!(records = records.len(), "Interrupted, saving what was collected");
            Outcome::Interrupted
        }
        Completion::Partial { page, error } => {
            warn!(
                page,
                error = %error,
                records = records.len(),
                "Stopped early after a failed page"
            );
            Outcome::Completed
        }
        Completion::Exhausted | Completion::Stopped => {
            if records.is_empty() {
                warn!(system = %args.system, "No users returned");
            }
            Outcome::Completed
        }
    };

    save_json(&path, &records)?;
    info!(
        system = %args.system,
        total = records.len(),
        pages = report.pages_fetched,
        path = %path.display(),
        "Fetch finished"
    );
    Ok(outcome)
}
