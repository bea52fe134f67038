#![allow(clippy::unwrap_used)]
// Integration tests for `ProgressPoller` against a mock carving service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lawliet_api::RecoveryClient;
use lawliet_core::{OperationStatus, ProgressPoller};

const TICK: Duration = Duration::from_millis(20);

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ProgressPoller) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = RecoveryClient::with_client(reqwest::Client::new(), base_url);
    (server, ProgressPoller::new(client))
}

fn operation(status: &str, progress: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "operation": { "status": status, "progress": progress, "message": "" }
    }))
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

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reducer_receives_snapshots() {
    let (server, poller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("running", 42))
        .mount(&server)
        .await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    poller.start("file_recovery", TICK, move |op| {
        let _ = tx.send(op);
    });

    let op = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(op.name, "file_recovery");
    assert_eq!(op.status, OperationStatus::Running);
    assert_eq!(op.progress, 42);
    assert!(poller.is_active("file_recovery"));

    poller.shutdown().await;
}

#[tokio::test]
async fn test_starting_twice_keeps_one_poll() {
    let (server, poller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("running", 10))
        .mount(&server)
        .await;

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    poller.start("file_recovery", TICK, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&second);
    poller.start("file_recovery", TICK, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(poller.active_count(), 1);
    tokio::time::sleep(TICK * 10).await;

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert!(second.load(Ordering::SeqCst) > 0);
    assert_eq!(poller.active_count(), 1);

    poller.shutdown().await;
}

#[tokio::test]
async fn test_stop_unknown_operation_is_noop() {
    let (_server, poller) = setup().await;

    poller.stop("file_recovery");

    assert_eq!(poller.active_count(), 0);
    assert!(!poller.is_active("file_recovery"));
}

#[tokio::test]
async fn test_reducer_can_stop_its_own_poll() {
    let (server, poller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("completed", 100))
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handle = poller.clone();
    poller.start("file_recovery", TICK, move |op| {
        counter.fetch_add(1, Ordering::SeqCst);
        if op.is_terminal() {
            handle.stop(&op.name);
        }
    });

    tokio::time::sleep(TICK * 10).await;
    let requests = progress_requests(&server).await;
    tokio::time::sleep(TICK * 5).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!poller.is_active("file_recovery"));
    assert_eq!(progress_requests(&server).await, requests);
}

#[tokio::test]
async fn test_failed_fetches_are_retried() {
    let (server, poller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/progress/file_recovery"))
        .respond_with(operation("running", 7))
        .mount(&server)
        .await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    poller.start("file_recovery", TICK, move |op| {
        let _ = tx.send(op);
    });

    let op = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(op.progress, 7);
    assert!(progress_requests(&server).await >= 3);

    poller.shutdown().await;
}

#[tokio::test]
async fn test_polls_for_different_operations_coexist() {
    let (server, poller) = setup().await;
    Mock::given(method("GET"))
        .respond_with(operation("running", 1))
        .mount(&server)
        .await;

    poller.start("file_recovery", TICK, |_| {});
    poller.start("file_upload", TICK, |_| {});

    assert_eq!(poller.active_count(), 2);
    assert_eq!(poller.active_operations(), ["file_recovery", "file_upload"]);

    poller.stop_all();
    assert_eq!(poller.active_count(), 0);
    poller.shutdown().await;
}
