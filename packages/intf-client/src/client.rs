//! Signed HTTP client for one endpoint.

use crate::endpoint::{far_user_path, Endpoint};
use crate::pagination::{PageRequest, PageSource};
use crate::records::{extract_records, Record};
use crate::stats::RunStats;
use crate::Error;
use intf_auth::{SignedHeader, Signer};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 500;

pub const HEADER_TIMESTAMP: &str = "TimeStamp";
pub const HEADER_DATABASE_ID: &str = "INTF-DatabaseID";

/// Signs and sends `GET` requests. One `reqwest::Client` is reused for every
/// request, including those issued concurrently by the pagination strategies.
pub struct ApiClient {
    http: reqwest::Client,
    signer: Signer,
    endpoint: Endpoint,
    database_id: Option<String>,
    stats: Arc<RunStats>,
}

impl ApiClient {
    pub fn new(
        signer: Signer,
        endpoint: Endpoint,
        database_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let database_id = database_id.filter(|id| !id.is_empty());
        if endpoint.database_header && database_id.is_none() {
            return Err(Error::Config(format!(
                "TENANT_1_DATABASE_ID is required for {}",
                endpoint.system
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            signer,
            endpoint,
            database_id,
            stats: Arc::new(RunStats::new()),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn stats(&self) -> &Arc<RunStats> {
        &self.stats
    }

    /// Header pairs for a signed `GET` of `path_and_query`.
    pub fn signed_headers(
        &self,
        path_and_query: &str,
    ) -> Result<Vec<(&'static str, String)>, Error> {
        let SignedHeader {
            authorization,
            timestamp,
        } = self.signer.sign_now("GET", path_and_query)?;
        let mut headers = vec![
            (HEADER_TIMESTAMP, timestamp),
            ("Authorization", authorization),
            ("Accept", "application/json".to_string()),
        ];
        if self.endpoint.database_header {
            if let Some(id) = &self.database_id {
                headers.push((HEADER_DATABASE_ID, id.clone()));
            }
        }
        Ok(headers)
    }

    /// Sign and send `GET path_and_query`; the same string is signed and sent.
    pub async fn get_json(&self, path_and_query: &str) -> Result<Value, Error> {
        let url = self.endpoint.url(path_and_query);
        let mut request = self.http.get(&url);
        for (name, value) in self.signed_headers(path_and_query)? {
            request = request.header(name, value);
        }

        debug!(url = %url, "GET");
        let start = Instant::now();
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                self.stats.record_error(false);
                return Err(Error::Transport(e.to_string()));
            }
        };
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            self.stats.record_error(false);
            Error::Transport(e.to_string())
        })?;
        self.stats.record_request(start);

        let result = parse_response(status, &body);
        if let Err(e) = &result {
            self.stats.record_error(matches!(e, Error::Auth { .. }));
            warn!(status, url = %url, error = %e, "Request failed");
        }
        result
    }

    /// Fetch one page and normalize it into records.
    pub async fn get_page(&self, request: PageRequest) -> Result<Vec<Record>, Error> {
        let path = self.endpoint.page_path(request.page, request.limit);
        let records = extract_records(self.get_json(&path).await?);
        self.stats.record_records(records.len());
        Ok(records)
    }

    /// Single user profile (FAR).
    pub async fn get_user(&self, user_id: &str) -> Result<Value, Error> {
        self.get_json(&far_user_path(user_id)).await
    }
}

impl PageSource for ApiClient {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Vec<Record>, Error>> + Send {
        self.get_page(request)
    }
}

/// Map status and body to a JSON value or a typed error.
pub fn parse_response(status: u16, body: &str) -> Result<Value, Error> {
    match status {
        200..=299 => {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(body).map_err(|e| Error::Protocol(format!("invalid JSON: {e}")))
        }
        401 | 403 => Err(Error::Auth { status, body: truncate(body) }),
        _ => Err(Error::Http { status, body: truncate(body) }),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}
