//! JSON dumps on local disk.

use crate::endpoint::System;
use crate::Error;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default dump path for a full fetch: `{system}_users.json`.
pub fn default_users_path(system: System) -> PathBuf {
    PathBuf::from(format!("{}_users.json", system.as_str().to_lowercase()))
}

/// Pretty-printed JSON, written atomically (tmp + rename).
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Io(format!("Failed to serialize output: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    if let Some(parent) = tmp.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("Failed to create {}: {e}", parent.display())))?;
    }
    std::fs::write(&tmp, json.as_bytes())
        .map_err(|e| Error::Io(format!("Failed to write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| Error::Io(format!("Failed to rename to {}: {e}", path.display())))?;

    info!(path = %path.display(), bytes = json.len(), "Saved JSON");
    Ok(())
}
