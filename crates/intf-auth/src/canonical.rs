//! Canonical request string for the INTF signature scheme.

use chrono::{DateTime, Utc};

/// Timestamp layout expected in the `TimeStamp` header and the signed string.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a UTC instant as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Format: `{VERB}\n\n\n{timestamp}\n{path_and_query}`.
///
/// The two empty lines are the (unused) content-md5 and content-type slots.
/// `path_and_query` must be byte-identical to what goes on the wire, query
/// parameters included, or the server rejects the request.
pub fn canonical_string(verb: &str, timestamp: &str, path_and_query: &str) -> String {
    let mut out = String::with_capacity(verb.len() + timestamp.len() + path_and_query.len() + 4);
    out.push_str(verb);
    out.push_str("\n\n\n");
    out.push_str(timestamp);
    out.push('\n');
    out.push_str(path_and_query);
    out
}
