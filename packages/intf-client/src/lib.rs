//! # INTF API client
//!
//! Signed pagination over the Interfolio REST APIs (RPT, FS, FAR) and a
//! name search over FAR activity data.
//!
//! ## Layout
//! - [`endpoint`] - per-variant hosts, paths and page addressing
//! - [`client`] - signed `GET` requests over one shared `reqwest::Client`
//! - [`pagination`] - sequential, windowed and worker-pool page drivers
//! - [`search`] - name matching and found-user bookkeeping
//! - [`commands`] - `fetch`, `find`, `preview` and `sign`

pub mod client;
pub mod commands;
pub mod config;
pub mod endpoint;
mod error;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod records;
pub mod report;
pub mod search;
pub mod stats;

pub use client::ApiClient;
pub use config::Settings;
pub use endpoint::{Endpoint, System};
pub use error::Error;
pub use pagination::{paginate, Completion, PageRequest, PageSource, RunReport, Strategy};
