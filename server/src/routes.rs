//! HTTP route handlers for the daynote server.
//!
//! This module provides the HTTP API endpoints:
//!
//! - `POST /append` - Append raw text to today's note
//! - `GET /health` - Health check endpoint
//!
//! # Architecture
//!
//! All routes share application state through [`AppState`], which contains
//! the [`Journal`], the [`Clock`] deciding what "today" is, and the server
//! start time for uptime reporting. Journal operations block on the
//! filesystem and run on tokio's blocking pool.
//!
//! # Example
//!
//! ```rust,no_run
//! use daynote_journal::{Config, Journal};
//! use daynote_server::routes::{create_router, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let journal = Journal::from_config(&Config::new("/home/me/ll"));
//!     let app = create_router(AppState::new(journal));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8765").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use daynote_journal::journal::run_blocking;
use daynote_journal::{AppendOutcome, Clock, Journal, SystemClock};

use crate::error::{Result, ServerError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum body size for appended text (1 MiB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The journal appended to.
    pub journal: Journal,

    /// Source of today's date.
    pub clock: Arc<dyn Clock>,

    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Creates application state that dates appends by the system clock.
    #[must_use]
    pub fn new(journal: Journal) -> Self {
        Self::with_clock(journal, Arc::new(SystemClock))
    }

    /// Creates application state with a custom clock.
    ///
    /// Useful for testing with a pinned date.
    #[must_use]
    pub fn with_clock(journal: Journal, clock: Arc<dyn Clock>) -> Self {
        Self {
            journal,
            clock,
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("root", &self.journal.layout().root())
            .field("clock", &"<dyn Clock>")
            .field("start_time", &self.start_time)
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the application router with all routes configured.
///
/// Every request is traced through `tower_http`'s [`TraceLayer`].
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/append", post(post_append))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
///
/// In-flight requests are allowed to complete after the shutdown signal.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the listener fails.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    info!(
        address = %address,
        root = %state.journal.layout().root().display(),
        "Append endpoint listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Append endpoint stopped");
    Ok(())
}

// ============================================================================
// POST /append - Append to Today's Note
// ============================================================================

/// Whether an append wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppendStatus {
    Success,
    Skipped,
}

/// Response body for `POST /append`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendResponse {
    pub status: AppendStatus,

    /// Path of today's note.
    pub path: PathBuf,
}

impl From<AppendOutcome> for AppendResponse {
    fn from(outcome: AppendOutcome) -> Self {
        match outcome {
            AppendOutcome::Appended { path } => Self {
                status: AppendStatus::Success,
                path,
            },
            AppendOutcome::Skipped { path } => Self {
                status: AppendStatus::Skipped,
                path,
            },
        }
    }
}

/// POST /append - Append the raw request body to today's note.
///
/// Today's note is created first if it does not exist yet. Text that already
/// occurs in the note is not appended again.
///
/// # Responses
///
/// - `200 OK` - `{"status": "success" | "skipped", "path": "..."}`
/// - `400 Bad Request` - Body is not valid UTF-8 (`invalid_encoding`)
/// - `413 Payload Too Large` - Body exceeds 1 MiB
/// - `500 Internal Server Error` - The note could not be written (`io_error`)
async fn post_append(State(state): State<AppState>, body: Bytes) -> Result<Json<AppendResponse>> {
    let content = String::from_utf8(body.to_vec())
        .map_err(|e| ServerError::invalid_encoding(e.utf8_error().to_string()))?;

    let today = state.clock.today();
    debug!(date = %today, bytes = content.len(), "Append request");

    let journal = state.journal.clone();
    let outcome = run_blocking(move || journal.append(today, &content)).await?;

    Ok(Json(outcome.into()))
}

// ============================================================================
// GET /health - Health Check
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status (always "ok" if responding).
    pub status: String,

    /// The date appends are currently written to.
    pub today: NaiveDate,

    /// Server uptime in seconds.
    pub uptime_seconds: u64,
}

/// GET /health - Health check endpoint.
///
/// ```json
/// {
///   "status": "ok",
///   "today": "2024-01-02",
///   "uptime_seconds": 3600
/// }
/// ```
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        today: state.clock.today(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use daynote_journal::{FixedClock, NoteLayout};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn jan_2() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn test_state(temp_dir: &TempDir) -> AppState {
        let journal = Journal::new(NoteLayout::new(temp_dir.path(), "md"));
        AppState::with_clock(journal, Arc::new(FixedClock::at_date(jan_2())))
    }

    fn append_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/append")
            .header("Content-Type", "text/plain")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn append_creates_note_and_reports_success() {
        let temp_dir = TempDir::new().unwrap();
        let app = create_router(test_state(&temp_dir));

        let response = app.oneshot(append_request("hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let expected = temp_dir.path().join("2024/01/2024-01-02.md");
        assert_eq!(json["status"], "success");
        assert_eq!(json["path"], expected.display().to_string());
        assert_eq!(
            fs::read_to_string(expected).unwrap(),
            "# 2024-01-02\n\n## todo\n\n---\n\nhello\n"
        );
    }

    #[tokio::test]
    async fn repeated_append_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let app = create_router(test_state(&temp_dir));

        let first = app.clone().oneshot(append_request("hello")).await.unwrap();
        assert_eq!(json_body(first).await["status"], "success");

        let second = app.oneshot(append_request("hello")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(json_body(second).await["status"], "skipped");

        let text = fs::read_to_string(temp_dir.path().join("2024/01/2024-01-02.md")).unwrap();
        assert_eq!(text.matches("hello").count(), 1);
    }

    #[tokio::test]
    async fn non_utf8_body_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let app = create_router(test_state(&temp_dir));

        let response = app
            .oneshot(append_request(vec![0x68, 0x69, 0xff, 0xfe]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid_encoding");
        assert!(!temp_dir.path().join("2024").exists());
    }

    #[tokio::test]
    async fn write_failure_returns_io_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("2024"), "not a directory").unwrap();
        let app = create_router(test_state(&temp_dir));

        let response = app.oneshot(append_request("hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["code"], "io_error");
        assert!(json["error"].as_str().unwrap().contains("2024"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let app = create_router(test_state(&temp_dir));

        let response = app
            .oneshot(append_request(vec![b'a'; MAX_BODY_SIZE + 1]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_reports_today() {
        let temp_dir = TempDir::new().unwrap();
        let app = create_router(test_state(&temp_dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["today"], "2024-01-02");
        assert!(json["uptime_seconds"].is_u64());
    }

    #[test]
    fn append_response_status_serializes_lowercase() {
        let response = AppendResponse::from(AppendOutcome::Skipped {
            path: PathBuf::from("/notes/2024/01/2024-01-02.md"),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["path"], "/notes/2024/01/2024-01-02.md");
    }
}
