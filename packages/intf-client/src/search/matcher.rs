//! Name matching against a single activity.

use super::NameQuery;
use serde::Serialize;
use serde_json::{Map, Value};

/// Key fragments that mark an activity as worth inspecting at all.
const NAME_BEARING_TERMS: [&str; 5] = ["name", "author", "faculty", "person", "user"];
/// Key fragments inspected by the field pass.
const FIELD_PASS_TERMS: [&str; 4] = ["name", "author", "faculty", "person"];
/// Values this short are ignored by the field pass.
const MIN_VALUE_LEN: usize = 3;

/// Field and value that matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEvidence {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    /// A name-like field held a variant or both names.
    NameField,
    /// A variant occurred somewhere in the serialized activity.
    WholeActivity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityMatch {
    pub pass: MatchPass,
    /// `None` when the whole-activity pass matched outside any string field.
    pub evidence: Option<MatchEvidence>,
}

pub(crate) fn key_has_any(key: &str, terms: &[&str]) -> bool {
    let key = key.to_lowercase();
    terms.iter().any(|t| key.contains(t))
}

pub(crate) fn fields(activity: &Value) -> Option<&Map<String, Value>> {
    activity.get("fields").and_then(Value::as_object)
}

/// Does `activity` mention the queried person?
pub fn match_activity(query: &NameQuery, activity: &Value) -> Option<ActivityMatch> {
    let fields = fields(activity)?;
    if !fields.keys().any(|k| key_has_any(k, &NAME_BEARING_TERMS)) {
        return None;
    }

    for (key, value) in fields {
        let Some(text) = value.as_str() else { continue };
        if text.chars().count() < MIN_VALUE_LEN || !key_has_any(key, &FIELD_PASS_TERMS) {
            continue;
        }
        let lower = text.to_lowercase();
        let hit = query.variants().iter().any(|v| lower.contains(v.as_str()))
            || (lower.contains(query.first()) && lower.contains(query.last()));
        if hit {
            return Some(ActivityMatch {
                pass: MatchPass::NameField,
                evidence: Some(MatchEvidence { field: key.clone(), value: text.to_string() }),
            });
        }
    }

    let whole = serde_json::to_string(activity).ok()?.to_lowercase();
    let variant = query.variants().iter().find(|v| whole.contains(v.as_str()))?;
    let evidence = fields.iter().find_map(|(key, value)| {
        let text = value.as_str()?;
        text.to_lowercase().contains(variant.as_str()).then(|| MatchEvidence {
            field: key.clone(),
            value: text.to_string(),
        })
    });
    Some(ActivityMatch { pass: MatchPass::WholeActivity, evidence })
}
