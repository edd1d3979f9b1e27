//! `intf preview <SYSTEM>`: one page of users, printed.

use super::{client_for, Outcome};
use crate::config::{Settings, FIND_PAGE_SIZE};
use crate::endpoint::{Endpoint, System};
use crate::pagination::PageRequest;
use crate::report::{emit, preview_lines};
use crate::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run(
    settings: &Settings,
    system: System,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<Outcome, Error> {
    let endpoint = Endpoint::users(system, settings.tenant_id())?;
    let client = client_for(settings, endpoint)?;
    let limit = limit.unwrap_or(FIND_PAGE_SIZE).max(1);

    info!(%system, limit, "Fetching one page of users");
    let users = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Interrupted before the page arrived");
            return Ok(Outcome::Interrupted);
        }
        r = client.get_page(PageRequest { page: 1, limit }) => r?,
    };
    if users.is_empty() {
        info!("No users found in the response");
        return Ok(Outcome::Completed);
    }
    emit(&preview_lines(&users));
    info!(count = users.len(), "Displayed users");
    Ok(Outcome::Completed)
}
