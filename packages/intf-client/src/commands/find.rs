//! `intf find`: search FAR activity data for FIRSTNAME/LASTNAME.

use super::{client_for, Outcome};
use crate::client::ApiClient;
use crate::config::{Settings, FIND_PAGE_SIZE};
use crate::endpoint::Endpoint;
use crate::output::save_json;
use crate::pagination::Completion;
use crate::report::{emit, found_users_lines, log_stats, partial_match_lines, Profile};
use crate::search::{find_users, lastname_search, FoundUsers};
use crate::Error;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct FindArgs {
    pub strategy: Option<String>,
    pub page_size: Option<usize>,
    pub output: Option<PathBuf>,
    /// Skip the per-user profile lookups.
    pub skip_profiles: bool,
}

/// Profile per found user; failed lookups become [`Profile::Unavailable`].
/// Returns `None` if cancelled part-way.
pub async fn fetch_profiles(
    client: &ApiClient,
    found: &FoundUsers,
    cancel: &CancellationToken,
) -> Option<BTreeMap<String, Profile>> {
    let mut profiles = BTreeMap::new();
    for id in found.ids() {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            r = client.get_user(id) => r,
        };
        let profile = match result {
            Ok(value) => Profile::from_value(&value),
            Err(e) => {
                warn!(user_id = %id, status = ?e.status(), error = %e, "Could not fetch profile");
                Profile::Unavailable
            }
        };
        profiles.insert(id.to_string(), profile);
    }
    Some(profiles)
}

pub async fn run(
    settings: &Settings,
    args: FindArgs,
    cancel: &CancellationToken,
) -> Result<Outcome, Error> {
    let query = settings.name_query()?;
    let limits = settings.search_limits();
    let strategy = settings.strategy(args.strategy.as_deref())?;
    let page_size = args.page_size.unwrap_or(settings.page_size_or(FIND_PAGE_SIZE));
    let client = Arc::new(client_for(settings, Endpoint::far_activities())?);

    info!(
        firstname = %settings.firstname,
        lastname = %settings.lastname,
        max_users = limits.max_users,
        early_exit = limits.early_exit,
        page_size,
        %strategy,
        "Searching for user"
    );

    let start = Instant::now();
    let outcome =
        find_users(Arc::clone(&client), strategy, page_size, &query, limits, cancel).await?;
    let found = outcome.found;
    info!(
        sections = outcome.sections_processed,
        found = found.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Search finished"
    );

    let mut result = Outcome::Completed;
    match &outcome.run.completion {
        Completion::Interrupted => {
            warn!(found = found.len(), "Search interrupted");
            result = Outcome::Interrupted;
        }
        Completion::Partial { page, error } => {
            warn!(
                page,
                error = %error,
                found = found.len(),
                "Returning users found before the error"
            );
        }
        Completion::Exhausted | Completion::Stopped => {}
    }

    if found.is_empty() {
        warn!(
            firstname = %settings.firstname,
            lastname = %settings.lastname,
            "No activities found for this name"
        );
        if result == Outcome::Completed {
            info!(lastname = %settings.lastname, "Trying last name alone on the first page");
            let fallback = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                r = lastname_search(&*client, &query, page_size) => Some(r),
            };
            match fallback {
                Some(Ok(matches)) => emit(&partial_match_lines(&settings.lastname, &matches)),
                Some(Err(e)) => warn!(error = %e, "Fallback search failed"),
                None => result = Outcome::Interrupted,
            }
        }
    } else {
        let profiles = if result == Outcome::Interrupted || args.skip_profiles {
            None
        } else {
            let profiles = fetch_profiles(&client, &found, cancel).await;
            if profiles.is_none() {
                result = Outcome::Interrupted;
            }
            profiles
        };
        emit(&found_users_lines(&found, profiles.as_ref()));

        let ids: Vec<&str> = found.ids().collect();
        info!(count = ids.len(), user_ids = ?ids, "Found user(s)");
    }

    if let Some(path) = &args.output {
        save_json(path, &found)?;
    }
    log_stats(&client.stats().snapshot());
    Ok(result)
}
