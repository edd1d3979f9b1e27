use crate::utils::{scratch_dir, settings, spawn, MockApi, PRIVATE_KEY};
use anyhow::Result;
use intf_client::commands::fetch::{self, FetchArgs};
use intf_client::commands::{preview, Outcome};
use intf_client::{Error, System};
use serde_json::Value;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

fn read_array(path: &std::path::Path) -> Result<Vec<Value>> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn args(
    system: System,
    output: std::path::PathBuf,
    page_size: usize,
    strategy: &str,
) -> FetchArgs {
    FetchArgs {
        system,
        output: Some(output),
        page_size: Some(page_size),
        strategy: Some(strategy.to_string()),
    }
}

#[tokio::test]
async fn test_fetch_far_users_sequential() -> Result<()> {
    let server = spawn(MockApi::with_users(103)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;
    let path = scratch_dir("fetch-seq").join("far_users.json");

    let args = args(System::Far, path.clone(), 25, "sequential");
    let outcome = fetch::run(&settings, args, &CancellationToken::new()).await?;
    assert_eq!(outcome, Outcome::Completed);

    let saved = read_array(&path)?;
    assert_eq!(saved.len(), 103);
    assert_eq!(saved[0]["id"], 1);
    assert_eq!(saved[102]["id"], 103);
    assert_eq!(server.api.user_hits.load(Ordering::SeqCst), 5);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
    Ok(())
}

#[tokio::test]
async fn test_fetch_rpt_wrapped_results_windowed() -> Result<()> {
    let server = spawn(MockApi::with_users(40)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[("window", "3")])?;
    let path = scratch_dir("fetch-rpt").join("rpt_users.json");

    let args = args(System::Rpt, path.clone(), 10, "windowed");
    fetch::run(&settings, args, &CancellationToken::new()).await?;
    let saved = read_array(&path)?;
    let ids: Vec<u64> = saved.iter().filter_map(|u| u["id"].as_u64()).collect();
    assert_eq!(ids, (1..=40).collect::<Vec<_>>());
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
    Ok(())
}

#[tokio::test]
async fn test_fetch_pool_matches_sequential() -> Result<()> {
    let server = spawn(MockApi::with_users(77)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[("workers", "4")])?;
    let dir = scratch_dir("fetch-pool");

    let cancel = CancellationToken::new();
    let sequential = args(System::Far, dir.join("seq.json"), 10, "sequential");
    fetch::run(&settings, sequential, &cancel).await?;
    fetch::run(&settings, args(System::Far, dir.join("pool.json"), 10, "pool"), &cancel).await?;

    assert_eq!(read_array(&dir.join("seq.json"))?, read_array(&dir.join("pool.json"))?);
    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn test_fetch_with_wrong_key_fails_without_output() -> Result<()> {
    let server = spawn(MockApi::with_users(10)).await?;
    let settings = settings(&server, "wrong-key", &[])?;
    let path = scratch_dir("fetch-auth").join("far_users.json");

    let args = args(System::Far, path.clone(), 5, "sequential");
    let result = fetch::run(&settings, args, &CancellationToken::new()).await;
    assert!(matches!(result, Err(Error::Auth { status: 403, .. })));
    assert!(!path.exists());
    assert_eq!(server.api.user_hits.load(Ordering::SeqCst), 0);
    assert_eq!(server.api.rejected.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_fetch_empty_system_saves_empty_array() -> Result<()> {
    let server = spawn(MockApi::with_users(0)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;
    let path = scratch_dir("fetch-empty").join("far_users.json");

    let args = args(System::Far, path.clone(), 5, "sequential");
    let outcome = fetch::run(&settings, args, &CancellationToken::new()).await?;
    assert_eq!(outcome, Outcome::Completed);
    assert!(read_array(&path)?.is_empty());
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
    Ok(())
}

#[tokio::test]
async fn test_fetch_interrupted_mid_run_saves_accumulated_pages() -> Result<()> {
    let cancel = CancellationToken::new();
    let server = spawn(MockApi::with_users(100).cancelling_at(3, cancel.clone())).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;
    let path = scratch_dir("fetch-interrupt").join("far_users.json");

    let args = args(System::Far, path.clone(), 10, "sequential");
    let outcome = fetch::run(&settings, args, &cancel).await?;
    assert_eq!(outcome, Outcome::Interrupted);

    // Pages 1 and 2 arrived; page 3 was in flight when the cancel fired.
    let saved = read_array(&path)?;
    let ids: Vec<u64> = saved.iter().filter_map(|u| u["id"].as_u64()).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    assert_eq!(server.api.user_hits.load(Ordering::SeqCst), 3);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
    Ok(())
}

#[tokio::test]
async fn test_fetch_interrupted_before_data_keeps_existing_file() -> Result<()> {
    let server = spawn(MockApi::with_users(30)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;
    let path = scratch_dir("fetch-interrupt-early").join("far_users.json");
    std::fs::create_dir_all(path.parent().unwrap())?;
    std::fs::write(&path, r#"[{"id":1},{"id":2}]"#)?;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let args = args(System::Far, path.clone(), 10, "sequential");
    let outcome = fetch::run(&settings, args, &cancel).await?;
    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(read_array(&path)?.len(), 2);
    assert_eq!(server.api.user_hits.load(Ordering::SeqCst), 0);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
    Ok(())
}

#[tokio::test]
async fn test_preview_interrupted_while_waiting() -> Result<()> {
    let cancel = CancellationToken::new();
    let server = spawn(MockApi::with_users(10).cancelling_at(1, cancel.clone())).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;

    let outcome = preview::run(&settings, System::Far, Some(5), &cancel).await?;
    assert_eq!(outcome, Outcome::Interrupted);
    Ok(())
}

#[tokio::test]
async fn test_preview_completes() -> Result<()> {
    let server = spawn(MockApi::with_users(10)).await?;
    let settings = settings(&server, PRIVATE_KEY, &[])?;

    let outcome = preview::run(&settings, System::Rpt, Some(5), &CancellationToken::new()).await?;
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(server.api.user_hits.load(Ordering::SeqCst), 1);
    Ok(())
}
