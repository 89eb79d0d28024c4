use std::path::{Component, Path};
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::scrapers::Credentials;
use crate::session::{Job, JobRunner};
use crate::status::StatusBoard;

const INDEX_HTML: &str = include_str!("index.html");

pub struct AppState {
    pub status: StatusBoard,
    pub runner: Arc<dyn JobRunner>,
    pub output_dir: std::path::PathBuf,
}

#[derive(Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    headless: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/scrape", post(start_scrape))
        .route("/api/status", get(get_status))
        .route("/download/{filename}", get(download))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn start_scrape(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrapeRequest>,
) -> Response {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Please enter your email address and password",
        );
    }

    let Some(writer) = state.status.try_begin() else {
        return error_response(StatusCode::CONFLICT, "A scrape is already running");
    };

    let job = Job {
        credentials: Credentials {
            email: body.email.trim().to_string(),
            password: body.password,
        },
        headless: body.headless,
    };
    info!("Starting scrape for {} (headless: {})", job.credentials.email, job.headless);

    if let Err(e) = state.runner.start(job, writer) {
        warn!("Could not start scrape worker: {e:#}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Could not start the scrape");
    }

    Json(json!({ "status": "started" })).into_response()
}

async fn get_status(State(state): State<Arc<AppState>>) -> Response {
    Json(state.status.snapshot()).into_response()
}

async fn download(
    State(state): State<Arc<AppState>>,
    UrlPath(filename): UrlPath<String>,
) -> Response {
    if !is_plain_file_name(&filename) {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }

    let path = state.output_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

/// A single normal path component: no separators, no `..`
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bare_file_names_are_served() {
        assert!(is_plain_file_name("spacemarket_favorites_20240101_000000.xlsx"));
        assert!(!is_plain_file_name("../Cargo.toml"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("a/b.xlsx"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("..\\secret"));
        assert!(!is_plain_file_name(""));
    }
}
