//! Integration tests for graceful shutdown
//!
//! A shutdown request interrupts the pipeline at its next wait or
//! checkpoint. The license is never revoked after an interruption.

mod common;

use common::{assignment_path, mail_config, TARGET_SKU, USER};
use mockito::{Matcher, Server};
use offboard::adapters::Services;
use offboard::core::pipeline::Orchestrator;
use offboard::core::shutdown::ShutdownSignal;
use offboard::core::transfer::NoProgress;
use offboard::domain::{OffboardError, UserEmail};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

#[tokio::test]
async fn test_shutdown_during_polling_cancels_run() {
    let mut server = Server::new_async().await;
    let staging = TempDir::new().unwrap();

    let _lookup = server
        .mock("GET", assignment_path(TARGET_SKU).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"productId": "Google-Apps", "skuId": "{TARGET_SKU}", "userId": "{USER}"}}"#
        ))
        .create_async()
        .await;
    let _matter = server
        .mock("POST", "/v1/matters")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"matterId": "m-1"}"#)
        .create_async()
        .await;
    let _export = server
        .mock("POST", "/v1/matters/m-1/exports")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "exp-1"}"#)
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/v1/matters/m-1/exports/exp-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "exp-1", "status": "IN_PROGRESS"}"#)
        .create_async()
        .await;
    let revoke = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = mail_config(&server.url(), staging.path(), "");
    config.export.poll_interval_secs = 3600;
    config.export.max_poll_attempts = None;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let services = Services::from_config(&config).unwrap();
    let orchestrator = Orchestrator::new(
        &services,
        config,
        ShutdownSignal::new(shutdown_rx),
        Arc::new(NoProgress),
    );

    let run = tokio::spawn(async move { orchestrator.run(&UserEmail::new(USER).unwrap()).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("run should stop promptly after shutdown")
        .unwrap();

    match result {
        Err(OffboardError::Cancelled(message)) => assert!(message.contains("poll")),
        other => panic!("Expected Cancelled, got {other:?}"),
    }
    revoke.assert_async().await;
}

#[tokio::test]
async fn test_shutdown_before_start_touches_nothing_after_license_check() {
    let mut server = Server::new_async().await;
    let staging = TempDir::new().unwrap();

    let _lookup = server
        .mock("GET", assignment_path(TARGET_SKU).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"productId": "Google-Apps", "skuId": "{TARGET_SKU}", "userId": "{USER}"}}"#
        ))
        .create_async()
        .await;
    let matters = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = mail_config(&server.url(), staging.path(), "");
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let services = Services::from_config(&config).unwrap();
    let orchestrator = Orchestrator::new(
        &services,
        config,
        ShutdownSignal::new(shutdown_rx),
        Arc::new(NoProgress),
    );

    let err = orchestrator
        .run(&UserEmail::new(USER).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, OffboardError::Cancelled(_)), "got {err:?}");
    matters.assert_async().await;
}

#[tokio::test]
async fn test_shutdown_signal_reaches_every_clone() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal = ShutdownSignal::new(shutdown_rx);
    let clone = signal.clone();

    assert!(!signal.is_requested());
    shutdown_tx.send(true).unwrap();

    assert!(signal.is_requested());
    assert!(clone.is_requested());
}
