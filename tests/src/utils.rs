//! In-process mock of the INTF APIs. Every request must carry a valid
//! signature over the exact path and query it was sent with.

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use intf_client::Settings;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const PUBLIC_KEY: &str = "test-public";
pub const PRIVATE_KEY: &str = "test-private";
pub const DATABASE_ID: &str = "db-42";
pub const TENANT_ID: &str = "1234";

#[derive(Default)]
pub struct MockApi {
    pub users: Vec<Value>,
    pub sections: Vec<Value>,
    pub profiles: HashMap<String, Value>,
    /// Requests that passed signature checks, by route.
    pub user_hits: AtomicU32,
    pub userdata_hits: AtomicU32,
    pub profile_hits: AtomicU32,
    pub rejected: AtomicU32,
    /// Fire the token while serving the n-th page request (1-based),
    /// before the response goes out.
    pub cancel_at: Option<(u32, CancellationToken)>,
}

impl MockApi {
    pub fn with_users(n: usize) -> Self {
        Self {
            users: (1..=n)
                .map(|i| {
                    json!({
                        "id": i,
                        "first_name": format!("First{i}"),
                        "last_name": format!("Last{i}"),
                        "email": format!("user{i}@example.edu"),
                    })
                })
                .collect(),
            ..Self::default()
        }
    }

    /// `n` single-activity sections; `hits` maps section index to (user id, author).
    pub fn with_sections(n: usize, hits: &[(usize, u64, &str)]) -> Self {
        let sections = (0..n)
            .map(|i| {
                let (user, author) = hits
                    .iter()
                    .find(|(at, _, _)| *at == i)
                    .map(|(_, user, author)| (*user, author.to_string()))
                    .unwrap_or((9000 + i as u64, "John Smith".to_string()));
                json!({
                    "section": {"name": format!("Section {i}")},
                    "activities": [{"userid": user, "fields": {"Author": author, "Title": "Work"}}]
                })
            })
            .collect();
        Self { sections, ..Self::default() }
    }

    pub fn cancelling_at(mut self, hit: u32, token: CancellationToken) -> Self {
        self.cancel_at = Some((hit, token));
        self
    }

    fn page_served(&self, hits: &AtomicU32) {
        let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, token)) = &self.cancel_at {
            if *at == hit {
                token.cancel();
            }
        }
    }
}

pub struct MockServer {
    pub base_url: String,
    pub api: Arc<MockApi>,
    handle: JoinHandle<()>,
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn(api: MockApi) -> Result<MockServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let api = Arc::new(api);

    let app = Router::new()
        .route("/users", get(far_users))
        .route("/users/{id}", get(far_profile))
        .route("/userdata", get(far_userdata))
        .route(
            "/byc/core/tenure/{tenant}/institutions/{institution}/users/search",
            get(logic_users),
        )
        .with_state(Arc::clone(&api));

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockServer {
        base_url: format!("http://{addr}"),
        api,
        handle,
    })
}

/// Settings pointing at `server`, keyed with `private_key`.
pub fn settings(
    server: &MockServer,
    private_key: &str,
    extra: &[(&str, &str)],
) -> Result<Settings> {
    let mut builder = config::Config::builder()
        .set_override("api_public_key", PUBLIC_KEY)?
        .set_override("api_private_key", private_key)?
        .set_override("tenant_1_id", TENANT_ID)?
        .set_override("tenant_1_database_id", DATABASE_ID)?
        .set_override("api_base_url", server.base_url.as_str())?
        .set_override("log_file", "")?;
    for (key, value) in extra {
        builder = builder.set_override(*key, *value)?;
    }
    Ok(Settings::from_config(builder.build()?)?)
}

pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("intf-it-{name}-{}", std::process::id()))
}

// --- Handlers ---

fn check_signature(
    api: &MockApi,
    uri: &Uri,
    headers: &HeaderMap,
    needs_db: bool,
) -> Result<(), Response> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("");
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("");

    let verified = intf_auth::verify_signature(
        PRIVATE_KEY.as_bytes(),
        PUBLIC_KEY,
        "GET",
        header("timestamp"),
        path,
        header("authorization"),
    );
    if verified.is_err() {
        api.rejected.fetch_add(1, Ordering::SeqCst);
        return Err((StatusCode::FORBIDDEN, "Access denied").into_response());
    }
    if needs_db && header("intf-databaseid") != DATABASE_ID {
        api.rejected.fetch_add(1, Ordering::SeqCst);
        return Err((StatusCode::UNAUTHORIZED, "Unknown database").into_response());
    }
    Ok(())
}

fn param(query: &HashMap<String, String>, key: &str) -> usize {
    query.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn slice(items: &[Value], offset: usize, limit: usize) -> Vec<Value> {
    items.iter().skip(offset).take(limit).cloned().collect()
}

async fn far_users(
    State(api): State<Arc<MockApi>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(r) = check_signature(&api, &uri, &headers, true) {
        return r;
    }
    api.page_served(&api.user_hits);
    let limit = param(&query, "limit");
    let page = param(&query, "page").max(1);
    Json(slice(&api.users, (page - 1) * limit, limit)).into_response()
}

async fn logic_users(
    State(api): State<Arc<MockApi>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(r) = check_signature(&api, &uri, &headers, false) {
        return r;
    }
    api.page_served(&api.user_hits);
    let limit = param(&query, "limit");
    let page = param(&query, "page").max(1);
    Json(json!({"results": slice(&api.users, (page - 1) * limit, limit)})).into_response()
}

async fn far_userdata(
    State(api): State<Arc<MockApi>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(r) = check_signature(&api, &uri, &headers, true) {
        return r;
    }
    api.page_served(&api.userdata_hits);
    let limit = param(&query, "limit");
    let offset = param(&query, "offset");
    Json(slice(&api.sections, offset, limit)).into_response()
}

async fn far_profile(
    State(api): State<Arc<MockApi>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(r) = check_signature(&api, &uri, &headers, true) {
        return r;
    }
    api.profile_hits.fetch_add(1, Ordering::SeqCst);
    match api.profiles.get(&id) {
        Some(profile) => Json(profile.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no such user").into_response(),
    }
}
