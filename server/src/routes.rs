//! HTTP route handlers for the Todo Watcher server.
//!
//! This module provides the HTTP API endpoints:
//!
//! - `GET /api/todos` - Parse the todo folder and return every file's tree
//! - `GET /api/open?file=<path>` - Open a todo file in the configured editor
//! - `GET /ws` - WebSocket stream of change notices
//! - `GET /health` - Health check endpoint
//!
//! # Architecture
//!
//! All routes share application state through [`AppState`], which contains:
//! - Configuration (todo folder, editor, parser options)
//! - Change broadcaster feeding the WebSocket clients
//! - Server start time for uptime reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_watcher_server::config::Config;
//! use todo_watcher_server::routes::{create_router, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("failed to load config");
//!     let address = config.bind_address();
//!     let app = create_router(AppState::new(config));
//!
//!     let listener = tokio::net::TcpListener::bind(address).await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use todo_watcher_core::{parse_dir, ParseOptions};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, trace, warn};

use crate::broadcast::ChangeBroadcaster;
use crate::config::Config;
use crate::editor::EditorLauncher;
use crate::error::ServerError;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Parser options derived from the configuration.
    pub parse_options: Arc<ParseOptions>,

    /// Change broadcaster for WebSocket clients.
    pub broadcaster: ChangeBroadcaster,

    /// Editor launcher for `/api/open`.
    pub launcher: EditorLauncher,

    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Creates application state with a fresh broadcaster.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_broadcaster(config, ChangeBroadcaster::new())
    }

    /// Creates application state around an existing broadcaster.
    ///
    /// The watcher publishes on the same broadcaster the WebSocket clients
    /// subscribe to.
    #[must_use]
    pub fn with_broadcaster(config: Config, broadcaster: ChangeBroadcaster) -> Self {
        let launcher = EditorLauncher::new(config.editor.clone(), config.todo_folder.clone());
        Self {
            parse_options: Arc::new(config.parse_options()),
            config: Arc::new(config),
            broadcaster,
            launcher,
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("todo_folder", &self.config.todo_folder)
            .field("broadcaster", &self.broadcaster)
            .field("launcher", &self.launcher)
            .field("start_time", &self.start_time)
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the application router with all routes configured.
///
/// Requests are traced with `tower_http`'s `TraceLayer`. CORS is permissive
/// because the dashboard frontend is served from a different origin during
/// development.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/todos", get(get_todos))
        .route("/api/open", get(get_open))
        .route("/ws", get(get_ws))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Error Response Types
// ============================================================================

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            editor: None,
        }
    }

    fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }
}

impl From<&ServerError> for ErrorResponse {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::Open(open) => {
                let body = Self::new(open.to_string()).with_code(open.code());
                match open.editor() {
                    Some(editor) => body.with_editor(editor),
                    None => body,
                }
            }
            other => Self::new(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, "Request rejected");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

// ============================================================================
// GET /api/todos - Task Trees
// ============================================================================

/// GET /api/todos - Parse the todo folder.
///
/// Every request runs a fresh full parse on a blocking thread. Files that
/// cannot be read are skipped (and logged); a folder that cannot be listed
/// fails the whole request.
///
/// # Responses
///
/// - `200 OK` - JSON array with one root task per file
/// - `500 Internal Server Error` - `{"error": "..."}`
async fn get_todos(State(state): State<AppState>) -> Response {
    let dir = state.config.todo_folder.clone();
    let options = Arc::clone(&state.parse_options);

    let result = tokio::task::spawn_blocking(move || parse_dir(&dir, &options)).await;
    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(err)) => return ServerError::from(err).into_response(),
        Err(join_err) => {
            return ServerError::internal(format!("parser task failed: {join_err}"))
                .into_response()
        }
    };

    if !report.is_complete() {
        warn!(
            skipped = report.failures.len(),
            "Some todo files could not be read"
        );
    }
    trace!(files = report.tasks.len(), "Serving parsed todos");
    (StatusCode::OK, Json(report.tasks)).into_response()
}

// ============================================================================
// GET /api/open - Open In Editor
// ============================================================================

/// Query parameters for `/api/open`.
#[derive(Debug, Default, Deserialize)]
pub struct OpenParams {
    #[serde(default)]
    pub file: Option<String>,
}

/// Response body for a successful open.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// GET /api/open - Open a todo file in the editor.
///
/// # Responses
///
/// - `200 OK` - `{"status": "OK"}`
/// - `400 Bad Request` - missing `file`, or file outside the todo folder
/// - `404 Not Found` - file does not exist
/// - `500 Internal Server Error` - editor not found or failed to start
async fn get_open(State(state): State<AppState>, Query(params): Query<OpenParams>) -> Response {
    let file = params.file.unwrap_or_default();
    match state.launcher.open(&file) {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "OK".to_string(),
            }),
        )
            .into_response(),
        Err(err) => ServerError::from(err).into_response(),
    }
}

// ============================================================================
// GET /ws - Change Notices
// ============================================================================

/// GET /ws - WebSocket stream of change notices.
///
/// Each change in the todo folder is sent as a text frame of the form
/// `"<OP>; <path>"`, where OP is one of WRITE, CREATE, DELETE or MOVE.
async fn get_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    info!("WebSocket client connecting");
    ws.on_upgrade(move |socket| handle_websocket(socket, state.broadcaster))
}

/// Handles an established WebSocket connection.
///
/// Subscribes to the broadcaster and forwards every notice to the client.
async fn handle_websocket(socket: axum::extract::ws::WebSocket, broadcaster: ChangeBroadcaster) {
    use axum::extract::ws::Message;
    use futures_util::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut notice_rx = broadcaster.subscribe();

    info!("WebSocket client connected");

    let forward_task = tokio::spawn(async move {
        loop {
            match notice_rx.recv().await {
                Ok(notice) => {
                    let text = notice.to_string();
                    trace!(notice = %text, "Sending notice to WebSocket client");
                    if let Err(err) = sender.send(Message::Text(text.into())).await {
                        debug!(error = %err, "Failed to send notice to WebSocket client");
                        break;
                    }
                }
                Err(RecvError::Lagged(count)) => {
                    warn!(skipped = count, "WebSocket client lagged, skipped notices");
                }
                Err(RecvError::Closed) => {
                    debug!("Change broadcaster closed");
                    break;
                }
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client sent close frame");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                debug!(error = %err, "WebSocket error");
                break;
            }
        }
    }

    forward_task.abort();
    info!("WebSocket client disconnected");
}

// ============================================================================
// GET /health - Health Check
// ============================================================================

/// Response body for health check endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status (always "ok" if responding).
    pub status: String,

    /// Number of active WebSocket connections.
    pub connections: usize,

    /// Server uptime in seconds.
    pub uptime_seconds: u64,
}

/// GET /health - Health check endpoint.
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.broadcaster.subscriber_count(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Tests
// ============================================================================
