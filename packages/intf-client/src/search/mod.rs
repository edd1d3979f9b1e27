//! Find the user ids behind a first/last name by scanning activity data.

mod fallback;
mod matcher;

pub use fallback::{
    lastname_matches, lastname_search, PartialMatch, FALLBACK_MAX_LIMIT, FALLBACK_MAX_MATCHES,
};
pub use matcher::{match_activity, ActivityMatch, MatchEvidence, MatchPass};

use crate::pagination::{paginate, PageSource, RunReport, Strategy};
use crate::records::{activities, section_name, user_id, Record};
use crate::Error;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

// --- Query ---

/// Lowercased names plus the spellings searched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    first: String,
    last: String,
    variants: Vec<String>,
}

impl NameQuery {
    pub fn new(first: &str, last: &str) -> Result<Self, Error> {
        let first = first.trim().to_lowercase();
        let last = last.trim().to_lowercase();
        let Some(initial) = first.chars().next() else {
            return Err(Error::Config("FIRSTNAME must be set".into()));
        };
        if last.is_empty() {
            return Err(Error::Config("LASTNAME must be set".into()));
        }
        let variants = vec![
            format!("{first} {last}"),
            format!("{last}, {first}"),
            format!("{initial}. {last}"),
            format!("{last} {first}"),
            format!("{last},{first}"),
        ];
        Ok(Self { first, last, variants })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

// --- Results ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundUser {
    pub user_id: String,
    /// Sections the user was found in (may repeat after merges).
    pub sections: Vec<String>,
    pub matching_fields: Vec<MatchEvidence>,
}

impl FoundUser {
    /// Sections without repeats, in first-seen order.
    pub fn distinct_sections(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for s in &self.sections {
            if !seen.contains(&s.as_str()) {
                seen.push(s.as_str());
            }
        }
        seen
    }
}

/// What to do when a user id is found again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first hit, ignore later ones.
    FirstWins,
    /// Append sections and evidence to the existing entry.
    Merge,
}

/// Found users keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FoundUsers {
    users: BTreeMap<String, FoundUser>,
}

impl FoundUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn get(&self, user_id: &str) -> Option<&FoundUser> {
        self.users.get(user_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoundUser> {
        self.users.values()
    }

    /// Returns `true` when the id was not present before.
    pub fn insert(&mut self, user: FoundUser, policy: DuplicatePolicy) -> bool {
        match self.users.get_mut(&user.user_id) {
            None => {
                self.users.insert(user.user_id.clone(), user);
                true
            }
            Some(existing) => {
                if policy == DuplicatePolicy::Merge {
                    existing.sections.extend(user.sections);
                    existing.matching_fields.extend(user.matching_fields);
                }
                false
            }
        }
    }

    /// Fold a page-local result set in.
    pub fn merge(&mut self, other: FoundUsers) {
        for user in other.users.into_values() {
            self.insert(user, DuplicatePolicy::Merge);
        }
    }
}

/// Early-exit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_users: usize,
    pub early_exit: bool,
}

impl SearchLimits {
    pub fn reached(&self, found: usize) -> bool {
        self.early_exit && found >= self.max_users
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self { max_users: 3, early_exit: true }
    }
}

// --- Scanning ---

fn found_in(query: &NameQuery, section: &str, activity: &Record) -> Option<FoundUser> {
    let id = user_id(activity)?;
    let hit = match_activity(query, activity)?;
    Some(FoundUser {
        user_id: id,
        sections: vec![section.to_string()],
        matching_fields: hit.evidence.into_iter().collect(),
    })
}

/// First-wins scan of one page. Breaks as soon as the limit is reached,
/// even mid-page.
pub fn scan_page(
    query: &NameQuery,
    records: &[Record],
    found: &mut FoundUsers,
    limits: SearchLimits,
) -> ControlFlow<()> {
    for record in records {
        let Some(items) = activities(record) else { continue };
        let section = section_name(record);
        for activity in items {
            if user_id(activity).is_some_and(|id| found.contains(&id)) {
                continue;
            }
            if let Some(user) = found_in(query, &section, activity) {
                info!(
                    user_id = %user.user_id,
                    section = %section,
                    total = found.len() + 1,
                    "Found user"
                );
                found.insert(user, DuplicatePolicy::FirstWins);
                if limits.reached(found.len()) {
                    info!(max_users = limits.max_users, "Enough users found, stopping early");
                    return ControlFlow::Break(());
                }
            }
        }
    }
    ControlFlow::Continue(())
}

/// Page-local scan without early exit, for merging into a shared set.
pub fn search_page(query: &NameQuery, records: &[Record]) -> FoundUsers {
    let mut local = FoundUsers::new();
    let unlimited = SearchLimits { max_users: usize::MAX, early_exit: false };
    let _ = scan_page(query, records, &mut local, unlimited);
    local
}

/// Number of activity-section records on a page.
pub fn section_count(records: &[Record]) -> usize {
    records.iter().filter(|r| activities(r).is_some()).count()
}

/// Result of a paginated search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub found: FoundUsers,
    pub sections_processed: usize,
    pub run: RunReport,
}

/// Page through activity data and collect matching users.
///
/// Sequential and windowed runs keep the first hit per user; the pool
/// searches each page on its own and merges.
pub async fn find_users<S: PageSource>(
    source: Arc<S>,
    strategy: Strategy,
    page_size: usize,
    query: &NameQuery,
    limits: SearchLimits,
    cancel: &CancellationToken,
) -> Result<SearchOutcome, Error> {
    let mut found = FoundUsers::new();
    let mut sections_processed = 0usize;
    let merge = matches!(strategy, Strategy::Pool { .. });

    let run = paginate(source, strategy, page_size, cancel, |page, records| {
        sections_processed += section_count(&records);
        let flow = if merge {
            found.merge(search_page(query, &records));
            if limits.reached(found.len()) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        } else {
            scan_page(query, &records, &mut found, limits)
        };
        info!(page, sections = sections_processed, found = found.len(), "Searched page");
        flow
    })
    .await?;

    Ok(SearchOutcome { found, sections_processed, run })
}
