//! Runtime settings from `intf.toml`, `.env` and the environment.

use crate::endpoint::Endpoint;
use crate::pagination::Strategy;
use crate::search::{NameQuery, SearchLimits};
use crate::Error;
use intf_auth::Signer;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const FETCH_PAGE_SIZE: usize = 100;
pub const FIND_PAGE_SIZE: usize = 25;
pub const DEFAULT_WINDOW: usize = 8;
pub const MAX_DEFAULT_WORKERS: usize = 16;

/// `min(cpus, 16)`.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}

/// Settings keyed by the lowercase form of the environment variable names.
#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_public_key: String,

    #[serde(default)]
    pub api_private_key: String,

    #[serde(default)]
    pub tenant_1_id: Option<String>,

    #[serde(default)]
    pub tenant_1_database_id: Option<String>,

    #[serde(default)]
    pub firstname: String,

    #[serde(default)]
    pub lastname: String,

    #[serde(default = "defaults::max_users")]
    pub max_users: usize,

    #[serde(default = "defaults::early_exit")]
    pub early_exit: bool,

    /// Unset means the per-command default.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// 0 means [`default_workers`].
    #[serde(default)]
    pub workers: usize,

    #[serde(default = "defaults::window")]
    pub window: usize,

    #[serde(default = "defaults::strategy")]
    pub strategy: String,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Empty disables the log file.
    #[serde(default = "defaults::log_file")]
    pub log_file: String,
}

impl Settings {
    /// Load `.env`, then `intf.toml` (optional) and the process environment.
    pub fn load() -> Result<Self, Error> {
        let _ = dotenvy::dotenv();
        let config = config::Config::builder()
            .add_source(config::File::with_name("intf").required(false))
            .add_source(environment())
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        Self::from_config(config)
    }

    pub fn from_config(config: config::Config) -> Result<Self, Error> {
        let settings: Self = config
            .try_deserialize()
            .map_err(|e| Error::Config(format!("invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.page_size == Some(0) {
            return Err(Error::Config("PAGE_SIZE must be at least 1".into()));
        }
        if self.max_users == 0 {
            return Err(Error::Config("MAX_USERS must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("REQUEST_TIMEOUT_SECS must be at least 1".into()));
        }
        Ok(())
    }

    pub fn signer(&self) -> Result<Signer, Error> {
        if self.api_public_key.is_empty() || self.api_private_key.is_empty() {
            return Err(Error::Config(
                "API_PUBLIC_KEY and API_PRIVATE_KEY must be set".into(),
            ));
        }
        Ok(Signer::new(
            self.api_public_key.clone(),
            self.api_private_key.as_bytes().to_vec(),
        ))
    }

    pub fn page_size_or(&self, default: usize) -> usize {
        self.page_size.unwrap_or(default)
    }

    pub fn workers(&self) -> usize {
        if self.workers == 0 {
            default_workers()
        } else {
            self.workers
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Strategy by name (command-line override first), sized from settings.
    pub fn strategy(&self, name: Option<&str>) -> Result<Strategy, Error> {
        Strategy::from_name(name.unwrap_or(&self.strategy), self.window, self.workers())
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_users: self.max_users,
            early_exit: self.early_exit,
        }
    }

    pub fn name_query(&self) -> Result<NameQuery, Error> {
        NameQuery::new(&self.firstname, &self.lastname)
            .map_err(|_| Error::Config("FIRSTNAME and LASTNAME must be set".into()))
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_1_id.as_deref()
    }

    pub fn database_id(&self) -> Option<String> {
        self.tenant_1_database_id.clone()
    }

    pub fn log_file(&self) -> Option<&str> {
        Some(self.log_file.as_str()).filter(|p| !p.is_empty())
    }

    /// Apply `API_BASE_URL` when set.
    pub fn route(&self, endpoint: Endpoint) -> Endpoint {
        match self.api_base_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => endpoint.with_base_url(url),
            None => endpoint,
        }
    }
}

/// Environment source. Values stay strings until deserialization, so keys and
/// ids that look numeric keep their exact text.
fn environment() -> config::Environment {
    config::Environment::default()
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_public_key", &self.api_public_key)
            .field("api_private_key", &"[redacted]")
            .field("tenant_1_id", &self.tenant_1_id)
            .field("tenant_1_database_id", &self.tenant_1_database_id)
            .field("max_users", &self.max_users)
            .field("early_exit", &self.early_exit)
            .field("page_size", &self.page_size)
            .field("workers", &self.workers)
            .field("window", &self.window)
            .field("strategy", &self.strategy)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

mod defaults {
    pub fn max_users() -> usize {
        3
    }

    pub fn early_exit() -> bool {
        true
    }

    pub fn window() -> usize {
        super::DEFAULT_WINDOW
    }

    pub fn strategy() -> String {
        "sequential".into()
    }

    pub fn request_timeout_secs() -> u64 {
        30
    }

    pub fn log_file() -> String {
        "user_search.log".into()
    }
}
