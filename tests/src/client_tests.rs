use crate::utils::{settings, spawn, MockApi, DATABASE_ID, PRIVATE_KEY};
use anyhow::Result;
use intf_auth::Signer;
use intf_client::client::DEFAULT_TIMEOUT;
use intf_client::{ApiClient, Endpoint, Error, PageRequest};
use serde_json::json;
use std::sync::atomic::Ordering;

fn far_client(base_url: &str, private_key: &str) -> Result<ApiClient> {
    Ok(ApiClient::new(
        Signer::new(crate::utils::PUBLIC_KEY, private_key.as_bytes().to_vec()),
        Endpoint::far_activities().with_base_url(base_url),
        Some(DATABASE_ID.to_string()),
        DEFAULT_TIMEOUT,
    )?)
}

#[tokio::test]
async fn test_get_user_profile() -> Result<()> {
    let mut api = MockApi::default();
    api.profiles.insert("7".into(), json!({"first_name": "Jane", "email": "jd@example.edu"}));
    let server = spawn(api).await?;

    let client = far_client(&server.base_url, PRIVATE_KEY)?;
    let profile = client.get_user("7").await?;
    assert_eq!(profile["first_name"], "Jane");

    match client.get_user("8").await {
        Err(Error::Http { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected 404, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_wrong_key_is_auth_error() -> Result<()> {
    let server = spawn(MockApi::with_sections(5, &[])).await?;
    let client = far_client(&server.base_url, "not-the-key")?;

    let result = client.get_page(PageRequest { page: 1, limit: 10 }).await;
    match result {
        Err(Error::Auth { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "Access denied");
        }
        other => panic!("expected auth error, got {other:?}"),
    }
    let stats = client.stats().snapshot();
    assert_eq!(stats.auth_failures, 1);
    assert_eq!(server.api.userdata_hits.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_offset_paging_reaches_second_page() -> Result<()> {
    let server = spawn(MockApi::with_sections(15, &[])).await?;
    let client = far_client(&server.base_url, PRIVATE_KEY)?;

    let second = client.get_page(PageRequest { page: 2, limit: 10 }).await?;
    assert_eq!(second.len(), 5);
    assert_eq!(second[0]["section"]["name"], "Section 10");
    Ok(())
}

#[tokio::test]
async fn test_settings_route_to_mock() -> Result<()> {
    let server = spawn(MockApi::with_users(3)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;
    let client = ApiClient::new(
        settings.signer()?,
        settings.route(Endpoint::users(intf_client::System::Far, None)?),
        settings.database_id(),
        settings.request_timeout(),
    )?;
    let users = client.get_page(PageRequest { page: 1, limit: 10 }).await?;
    assert_eq!(users.len(), 3);
    Ok(())
}
