//! Human-readable reports, emitted line by line through `tracing`.

use crate::records::{str_field, Record};
use crate::search::{FoundUsers, PartialMatch};
use crate::stats::StatsSnapshot;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

const NA: &str = "N/A";

fn text<'a>(record: &'a Value, keys: &[&str]) -> &'a str {
    str_field(record, keys).unwrap_or(NA)
}

/// What a profile lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    Verified {
        first_name: String,
        last_name: String,
        email: String,
    },
    /// Response that was not a JSON object.
    Raw(String),
    Unavailable,
}

impl Profile {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => Profile::Verified {
                first_name: text(value, &["first_name", "firstName"]).to_string(),
                last_name: text(value, &["last_name", "lastName"]).to_string(),
                email: text(value, &["email"]).to_string(),
            },
            Value::Null => Profile::Unavailable,
            other => Profile::Raw(other.to_string()),
        }
    }
}

/// Report for found users. `profiles` is `None` when lookups were skipped
/// (interrupted run).
pub fn found_users_lines(
    found: &FoundUsers,
    profiles: Option<&BTreeMap<String, Profile>>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for user in found.iter() {
        lines.push("FOUND USER:".to_string());
        lines.push(format!("   User ID: {}", user.user_id));
        lines.push(format!("   Found in sections: {}", user.distinct_sections().join(", ")));

        if !user.matching_fields.is_empty() {
            lines.push("   Matching fields:".to_string());
            let mut seen = HashSet::new();
            for m in &user.matching_fields {
                if seen.insert(m.value.as_str()) {
                    lines.push(format!("      {}: {}", m.field, m.value));
                }
            }
        }

        let Some(profiles) = profiles else { continue };
        match profiles.get(&user.user_id).unwrap_or(&Profile::Unavailable) {
            Profile::Verified { first_name, last_name, email } => {
                lines.push("   Profile verification:".to_string());
                lines.push(format!("      First Name: {first_name}"));
                lines.push(format!("      Last Name: {last_name}"));
                lines.push(format!("      Email: {email}"));
            }
            Profile::Raw(raw) => lines.push(format!("   Profile: {raw}")),
            Profile::Unavailable => lines.push("   Profile: Could not fetch".to_string()),
        }
    }
    lines
}

/// Partial last-name matches, one line per distinct user.
pub fn partial_match_lines(last_name: &str, matches: &[PartialMatch]) -> Vec<String> {
    if matches.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Partial matches for '{last_name}':")];
    let mut seen = HashSet::new();
    for m in matches {
        if seen.insert(m.user_id.as_str()) {
            lines.push(format!("   User ID {}: {} = {}", m.user_id, m.field, m.value));
        }
    }
    lines
}

/// One page of users, as shown by `preview`.
pub fn preview_lines(users: &[Record]) -> Vec<String> {
    let mut lines = vec![format!("Showing: {} users", users.len())];
    for (i, user) in users.iter().enumerate() {
        lines.push(format!("--- USER {} ---", i + 1));
        lines.push(format!(
            "Name: {} {}",
            text(user, &["first_name"]),
            text(user, &["last_name"])
        ));
        lines.push(format!("Email: {}", text(user, &["email"])));
        lines.push(format!("Role: {}", text(user, &["role"])));

        let units: Vec<&str> = user
            .get("administrator_unit_names")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if !units.is_empty() {
            lines.push(format!("Administrator Units: {}", units.join(", ")));
        }

        match user.get("titles").and_then(Value::as_array).filter(|t| !t.is_empty()) {
            Some(titles) => {
                lines.push("Titles:".to_string());
                for title in titles {
                    lines.push(format!(
                        "  - {} ({})",
                        text(title, &["name"]),
                        text(title, &["unit_name"])
                    ));
                }
            }
            None => lines.push("Titles: None".to_string()),
        }
    }
    lines
}

pub fn emit(lines: &[String]) {
    for line in lines {
        info!("{line}");
    }
}

pub fn log_stats(stats: &StatsSnapshot) {
    info!(
        requests = stats.requests,
        errors = stats.request_errors,
        auth_failures = stats.auth_failures,
        records = stats.records,
        avg_ms = stats.avg_latency.as_millis() as u64,
        max_ms = stats.max_latency.as_millis() as u64,
        "Request stats"
    );
}
