#![allow(clippy::unwrap_used)]
// Integration tests for the recovery job lifecycle.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lawliet_api::RecoveryClient;
use lawliet_core::{
    BlockDevice, ClientConfig, Controller, CoreError, JobPhase, Notification, NotificationLevel,
    SourceMode, SourceSelection, StoredImage, ValidationError,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = RecoveryClient::with_client(reqwest::Client::new(), base_url.clone());
    let mut config = ClientConfig::new(base_url);
    config.poll_interval = Duration::from_millis(50);
    (server, Controller::with_client(config, client))
}

fn image_selection(name: &str) -> SourceSelection {
    let mut selection = SourceSelection::with_sources(
        vec![StoredImage {
            name: name.into(),
            size_human: "500.00 MB".into(),
            size_bytes: Some(524_288_000),
        }],
        Vec::new(),
    );
    selection.select_image(name);
    selection
}

fn operation(status: &str, progress: u32, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "operation": { "status": status, "progress": progress, "message": message }
    }))
}

async fn mount_accepting_recover(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/recover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File recovery started"
        })))
        .mount(server)
        .await;
}

async fn mount_rejecting_recover(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/recover"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Arc<Notification>>) -> Vec<Arc<Notification>> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

async fn progress_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/progress/file_recovery")
        .count()
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_image_job_runs_to_completion() {
    let (server, controller) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/recover"))
        .and(body_json(json!({ "buffer_size": 8, "image_path": "disk1.img" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File recovery started"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("running", 42, "carving"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("completed", 100, "done"))
        .mount(&server)
        .await;

    let mut notifications = controller.notifications();
    let job = controller.job();
    let mut states = job.subscribe();
    let watcher = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(state) = states.changed().await {
            seen.push(state.progress);
            if state.phase == JobPhase::Completed {
                break;
            }
        }
        seen
    });

    let ack = controller
        .submit_recovery(&image_selection("disk1.img"), 8)
        .await
        .unwrap();
    assert_eq!(ack.operation, "file_recovery");
    assert!(!job.state().can_submit());

    let state = tokio::time::timeout(Duration::from_secs(5), job.wait_for_terminal())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.phase, JobPhase::Completed);
    assert_eq!(state.progress, 100);
    assert!(state.can_submit());
    assert!(!job.is_in_flight());

    let seen = tokio::time::timeout(Duration::from_secs(5), watcher)
        .await
        .unwrap()
        .unwrap();
    assert!(seen.contains(&42), "progress values seen: {seen:?}");

    // Polling has stopped for good.
    assert!(!controller.poller().is_active("file_recovery"));
    let polled = progress_requests(&server).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(progress_requests(&server).await, polled);

    let messages: Vec<String> = drain(&mut notifications)
        .iter()
        .map(|n| n.message.clone())
        .collect();
    assert_eq!(messages, ["Recovery started", "Recovery completed!"]);
}

#[tokio::test]
async fn test_device_job_sends_device_path() {
    let (server, controller) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/recover"))
        .and(body_json(json!({ "buffer_size": 64, "device_path": "/dev/sdb" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("completed", 100, ""))
        .mount(&server)
        .await;

    let mut selection = SourceSelection::with_sources(
        Vec::new(),
        vec![BlockDevice {
            path: "/dev/sdb".into(),
            size_human: "14.9G".into(),
            model: "Unknown".into(),
            mountpoint: None,
        }],
    );
    selection.switch_mode(SourceMode::Device);
    selection.select_device("/dev/sdb").unwrap();

    controller.submit_recovery(&selection, 64).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), controller.job().wait_for_terminal())
        .await
        .unwrap()
        .unwrap();
}

// ── Validation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_device_selection_is_rejected_locally() {
    let (server, controller) = setup().await;
    mount_rejecting_recover(&server).await;

    let mut selection = SourceSelection::new();
    selection.switch_mode(SourceMode::Device);

    let err = controller.submit_recovery(&selection, 8).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::NoSourceSelected)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(controller.job().state().can_submit());
}

#[tokio::test]
async fn test_buffer_size_out_of_range_is_rejected_locally() {
    let (server, controller) = setup().await;
    mount_rejecting_recover(&server).await;
    let mut notifications = controller.notifications();

    for size in [0, 1025] {
        let err = controller
            .submit_recovery(&image_selection("disk1.img"), size)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::BufferSizeRange { value }) if value == size
        ));
    }

    assert!(server.received_requests().await.unwrap().is_empty());
    let levels: Vec<NotificationLevel> = drain(&mut notifications)
        .iter()
        .map(|n| n.level)
        .collect();
    assert_eq!(levels, [NotificationLevel::Warning, NotificationLevel::Warning]);
}

#[tokio::test]
async fn test_buffer_size_bounds_are_accepted() {
    let (server, controller) = setup().await;
    for size in [1, 1024] {
        Mock::given(method("POST"))
            .and(path("/api/recover"))
            .and(body_json(json!({ "buffer_size": size, "image_path": "disk1.img" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("completed", 100, ""))
        .mount(&server)
        .await;

    for size in [1, 1024] {
        controller
            .submit_recovery(&image_selection("disk1.img"), size)
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), controller.job().wait_for_terminal())
            .await
            .unwrap()
            .unwrap();
    }

    server.verify().await;
}

#[tokio::test]
async fn test_second_submission_while_running_is_rejected() {
    let (server, controller) = setup().await;
    mount_accepting_recover(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("running", 5, ""))
        .mount(&server)
        .await;

    let selection = image_selection("disk1.img");
    controller.submit_recovery(&selection, 8).await.unwrap();
    let err = controller.submit_recovery(&selection, 8).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::JobInFlight)
    ));
    assert_eq!(controller.poller().active_count(), 1);

    controller.job().cancel();
    assert!(!controller.poller().is_active("file_recovery"));
    let err = controller.job().wait_for_terminal().await.unwrap_err();
    assert!(matches!(err, CoreError::Cancelled { .. }));
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rejected_submission_reenables_submit() {
    let (server, controller) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/recover"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "error": "File recovery already in progress"
        })))
        .mount(&server)
        .await;
    let mut notifications = controller.notifications();

    let err = controller
        .submit_recovery(&image_selection("disk1.img"), 8)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Server { status: Some(409), .. }));
    assert!(controller.job().state().can_submit());
    assert!(!controller.job().is_in_flight());
    assert_eq!(controller.poller().active_count(), 0);

    let notes = drain(&mut notifications);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert!(notes[0].message.contains("File recovery already in progress"));
}

#[tokio::test]
async fn test_job_error_status_is_reported_once() {
    let (server, controller) = setup().await;
    mount_accepting_recover(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("error", 13, "read failure at sector 2048"))
        .mount(&server)
        .await;
    let mut notifications = controller.notifications();

    controller
        .submit_recovery(&image_selection("disk1.img"), 8)
        .await
        .unwrap();
    let err = tokio::time::timeout(Duration::from_secs(5), controller.job().wait_for_terminal())
        .await
        .unwrap()
        .unwrap_err();

    match err {
        CoreError::JobFailed { message } => assert_eq!(message, "read failure at sector 2048"),
        other => panic!("expected JobFailed, got: {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    let errors: Vec<String> = drain(&mut notifications)
        .iter()
        .filter(|n| n.level == NotificationLevel::Error)
        .map(|n| n.message.clone())
        .collect();
    assert_eq!(errors, ["Error: read failure at sector 2048"]);
    assert!(controller.job().state().can_submit());
}

#[tokio::test]
async fn test_transient_poll_failures_do_not_end_the_job() {
    let (server, controller) = setup().await;
    mount_accepting_recover(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("completed", 100, ""))
        .mount(&server)
        .await;

    controller
        .submit_recovery(&image_selection("disk1.img"), 8)
        .await
        .unwrap();
    let state = tokio::time::timeout(Duration::from_secs(5), controller.job().wait_for_terminal())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(state.phase, JobPhase::Completed);
    assert!(progress_requests(&server).await >= 3);
}
