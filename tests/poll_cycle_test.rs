//! Polling cycle tests
//!
//! Runs whole delivery cycles against mock HTTP endpoints standing in for
//! the remote results API and the local API, then checks the files and the
//! cycle report.

use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

use courier::adapters::emr::FixedEmrPaths;
use courier::config::CourierConfig;
use courier::core::pipeline::{DeliveryCoordinator, RecordProcessor};

fn config_for(remote_url: &str, local_url: &str) -> CourierConfig {
    toml::from_str(&format!(
        r#"
        [application]

        [remote_api]
        base_url = "{remote_url}"
        username = "clinic"
        password = "secret"

        [local_api]
        endpoint = "{local_url}"
        "#
    ))
    .expect("test config should parse")
}

fn unsent_records_body() -> &'static str {
    r#"[
        {
            "patient": {"id": "8173", "familyName": "Citizen", "targetEmr": "BestPractice"},
            "observation": {"identifier": "14647-2", "identifierText": "Cholesterol", "value": "6.2"}
        },
        {
            "patient": {"id": "8174", "targetEmr": "BestPractice"},
            "observation": {"identifier": "14647-2", "identifierText": "Cholesterol"}
        }
    ]"#
}

#[tokio::test]
async fn test_full_cycle_applies_remote_config_and_token() {
    let out_dir = tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;

    let login = server
        .mock("POST", "/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"userName": "clinic", "token": "token-1", "accountId": 42}"#)
        .create_async()
        .await;
    let system_config = server
        .mock("POST", "/SystemConfig")
        .match_header("authorization", "Bearer token-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"serviceDelayMilliseconds": 15000, "messageOutputDir": "{}"}}"#,
            out_dir.path().display()
        ))
        .create_async()
        .await;
    // The local fetch must reuse the remote session token
    let unsent = server
        .mock("GET", "/GetUnsentMessages")
        .match_header("authorization", "Bearer token-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(unsent_records_body())
        .create_async()
        .await;

    let config = config_for(&server.url(), &server.url());
    let coordinator = DeliveryCoordinator::new(config);
    let report = coordinator.run_cycle().await.unwrap();

    login.assert_async().await;
    system_config.assert_async().await;
    unsent.assert_async().await;

    assert_eq!(report.summary.written, 2);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.next_delay, Duration::from_millis(15_000));
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_remote_outage_degrades_to_local_config() {
    let out_dir = tempdir().unwrap();
    // A server with no routes rejects the login outright
    let remote = mockito::Server::new_async().await;
    let mut local = mockito::Server::new_async().await;

    let unsent = local
        .mock("GET", "/GetUnsentMessages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(unsent_records_body())
        .create_async()
        .await;

    let mut config = config_for(&remote.url(), &local.url());
    config.delivery.output_dir = Some(out_dir.path().display().to_string());
    config.delivery.delay_ms = 5_000;

    let report = DeliveryCoordinator::new(config).run_cycle().await.unwrap();

    unsent.assert_async().await;
    assert_eq!(report.summary.written, 2);
    // Without remote config the locally configured delay stands
    assert_eq!(report.next_delay, Duration::from_millis(5_000));
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_cycle_surfaces_record_fetch_failure() {
    let remote = mockito::Server::new_async().await;
    let mut local = mockito::Server::new_async().await;

    local
        .mock("GET", "/GetUnsentMessages")
        .with_status(500)
        .with_body("records store offline")
        .create_async()
        .await;

    let mut config = config_for(&remote.url(), &local.url());
    config.delivery.output_dir = Some("/tmp/unused".to_string());

    assert!(DeliveryCoordinator::new(config).run_cycle().await.is_err());
}

#[tokio::test]
async fn test_empty_batch_completes_cleanly() {
    let remote = mockito::Server::new_async().await;
    let mut local = mockito::Server::new_async().await;

    local
        .mock("GET", "/GetUnsentMessages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let out_dir = tempdir().unwrap();
    let mut config = config_for(&remote.url(), &local.url());
    config.delivery.output_dir = Some(out_dir.path().display().to_string());

    let report = DeliveryCoordinator::new(config).run_cycle().await.unwrap();

    assert_eq!(report.summary.total(), 0);
    assert!(report.summary.is_successful());
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_cycle_accounts_for_silent_and_failed_records() {
    let remote = mockito::Server::new_async().await;
    let mut local = mockito::Server::new_async().await;

    local
        .mock("GET", "/GetUnsentMessages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "patient": {"id": "1", "targetEmr": "BestPractice"},
                    "observation": {"identifier": "14647-2"}
                },
                {
                    "patient": {"id": "2", "targetEmr": "BestPractice"},
                    "observation": {"identifier": "14647-2"},
                    "isSilent": true
                },
                {
                    "patient": {"targetEmr": "BestPractice"},
                    "observation": {"identifier": "14647-2"}
                }
            ]"#,
        )
        .create_async()
        .await;

    let out_dir = tempdir().unwrap();
    let mut config = config_for(&remote.url(), &local.url());
    config.delivery.output_dir = Some(out_dir.path().display().to_string());

    let report = DeliveryCoordinator::new(config).run_cycle().await.unwrap();

    assert_eq!(report.summary.summary_line(), "written=1 silent=1 failed=1");
    assert!(!report.summary.is_successful());
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_injected_repository_resolves_directories() {
    let remote = mockito::Server::new_async().await;
    let mut local = mockito::Server::new_async().await;

    local
        .mock("GET", "/GetUnsentMessages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(unsent_records_body())
        .create_async()
        .await;

    // No output override anywhere: directories come from the repository
    let bp_dir = tempdir().unwrap();
    let config = config_for(&remote.url(), &local.url());
    let coordinator = DeliveryCoordinator::new(config).with_repository(Arc::new(
        FixedEmrPaths::new().with_bp_report_path(bp_dir.path()),
    ));

    let report = coordinator.run_cycle().await.unwrap();

    assert_eq!(report.summary.written, 2);
    assert_eq!(std::fs::read_dir(bp_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_pushed_batch_delivers_without_local_api() {
    // Pushed records are already in hand; no route on either server
    let remote = mockito::Server::new_async().await;
    let local = mockito::Server::new_async().await;

    let out_dir = tempdir().unwrap();
    let mut config = config_for(&remote.url(), &local.url());
    config.delivery.output_dir = Some(out_dir.path().display().to_string());

    let coordinator = DeliveryCoordinator::new(config);
    let records = serde_json::from_str(unsent_records_body()).unwrap();
    let summary = coordinator.process(records).await.unwrap();

    assert_eq!(summary.written, 2);
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 2);
}
