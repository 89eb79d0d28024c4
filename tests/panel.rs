//! Control panel routes, with a runner that never launches a browser.

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use spacemarket_favorites::panel::{router, AppState};
use spacemarket_favorites::session::{Job, JobRunner};
use spacemarket_favorites::status::{JobStatus, StatusBoard, StatusWriter};

/// Accepts jobs and keeps their writers alive, so they stay "running".
#[derive(Default)]
struct HoldingRunner {
    jobs: Mutex<Vec<Job>>,
    writers: Mutex<Vec<StatusWriter>>,
}

impl JobRunner for HoldingRunner {
    fn start(&self, job: Job, writer: StatusWriter) -> anyhow::Result<()> {
        self.jobs.lock().unwrap().push(job);
        self.writers.lock().unwrap().push(writer);
        Ok(())
    }
}

struct Panel {
    app: Router,
    status: StatusBoard,
    runner: Arc<HoldingRunner>,
    dir: tempfile::TempDir,
}

fn panel() -> Panel {
    let dir = tempfile::tempdir().unwrap();
    let status = StatusBoard::new();
    let runner = Arc::new(HoldingRunner::default());
    let state = Arc::new(AppState {
        status: status.clone(),
        runner: runner.clone(),
        output_dir: dir.path().to_path_buf(),
    });

    Panel {
        app: router(state),
        status,
        runner,
        dir,
    }
}

fn start_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn start_hands_the_job_to_the_runner() {
    let p = panel();

    let response = p
        .app
        .clone()
        .oneshot(start_request(json!({
            "email": " member@example.com ",
            "password": "secret",
            "headless": true
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "started" }));

    let jobs = p.runner.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].credentials.email, "member@example.com");
    assert!(jobs[0].headless);
    assert!(p.status.snapshot().is_running);
}

#[tokio::test]
async fn second_start_is_rejected_while_running() {
    let p = panel();
    let body = json!({ "email": "a@example.com", "password": "pw" });

    let first = p.app.clone().oneshot(start_request(body.clone())).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let before = p.status.snapshot();

    let second = p.app.clone().oneshot(start_request(body)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert!(json_body(second).await["error"].is_string());

    assert_eq!(p.status.snapshot(), before);
    assert_eq!(p.runner.jobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_credentials_are_a_bad_request() {
    let p = panel();

    let response = p
        .app
        .clone()
        .oneshot(start_request(json!({ "email": "a@example.com" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!p.status.snapshot().is_running);
    assert!(p.runner.jobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn status_reflects_the_board() {
    let p = panel();

    let idle: JobStatus =
        serde_json::from_value(json_body(p.app.clone().oneshot(get("/api/status")).await.unwrap()).await)
            .unwrap();
    assert_eq!(idle, JobStatus::default());

    p.status
        .try_begin()
        .unwrap()
        .succeed("/download/x.xlsx".into(), 5);

    let body = json_body(p.app.clone().oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(body["is_running"], json!(false));
    assert_eq!(body["progress"], json!(100));
    assert_eq!(body["download_url"], json!("/download/x.xlsx"));
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn download_serves_exported_files_only() {
    let p = panel();
    let name = "spacemarket_favorites_20240101_120000.xlsx";
    std::fs::write(p.dir.path().join(name), b"PK\x03\x04fake").unwrap();

    let found = p
        .app
        .clone()
        .oneshot(get(&format!("/download/{name}")))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    let disposition = found.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(name));
    let bytes = to_bytes(found.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"PK\x03\x04fake");

    let missing = p.app.clone().oneshot(get("/download/nope.xlsx")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let escape = p.app.clone().oneshot(get("/download/..%2FCargo.toml")).await.unwrap();
    assert_eq!(escape.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_page_is_served() {
    let p = panel();
    let response = p.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/api/scrape"));
}
