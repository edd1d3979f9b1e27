//! Last-name-only search over the first page, used when the full search
//! found nothing.

use super::matcher::{fields, key_has_any};
use super::NameQuery;
use crate::pagination::{PageRequest, PageSource};
use crate::records::{activities, user_id, Record};
use crate::Error;
use serde::Serialize;

pub const FALLBACK_MAX_LIMIT: usize = 200;
pub const FALLBACK_MAX_MATCHES: usize = 10;
const FALLBACK_TERMS: [&str; 3] = ["name", "author", "faculty"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialMatch {
    pub user_id: String,
    pub field: String,
    pub value: String,
}

/// At most one match per activity, capped at [`FALLBACK_MAX_MATCHES`].
pub fn lastname_matches(query: &NameQuery, records: &[Record]) -> Vec<PartialMatch> {
    let mut matches = Vec::new();
    for activity in records.iter().filter_map(activities).flatten() {
        if matches.len() >= FALLBACK_MAX_MATCHES {
            break;
        }
        let (Some(id), Some(fields)) = (user_id(activity), fields(activity)) else {
            continue;
        };
        let hit = fields.iter().find_map(|(key, value)| {
            let text = value.as_str()?;
            let usable = text.chars().count() > 3
                && key_has_any(key, &FALLBACK_TERMS)
                && text.to_lowercase().contains(query.last());
            usable.then(|| PartialMatch {
                user_id: id.clone(),
                field: key.clone(),
                value: text.to_string(),
            })
        });
        matches.extend(hit);
    }
    matches
}

/// Fetch the first page (limit capped at [`FALLBACK_MAX_LIMIT`]) and look for
/// the last name alone.
pub async fn lastname_search<S: PageSource>(
    source: &S,
    query: &NameQuery,
    page_size: usize,
) -> Result<Vec<PartialMatch>, Error> {
    let limit = page_size.clamp(1, FALLBACK_MAX_LIMIT);
    let records = source.fetch_page(PageRequest { page: 1, limit }).await?;
    Ok(lastname_matches(query, &records))
}
