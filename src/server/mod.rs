//! Portal HTTP server.
//!
//! Serves the login gate, the navigation shell, and the file browser over
//! the configured content source.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check (no auth)
//! - `POST /login` - Exchange credentials for a session token
//! - `POST /logout` - End the session
//! - `GET /session` - Current login and navigation state
//! - `POST /view` - Select a view (Home, Course Content, Contact)
//! - `GET /files` - List course files
//! - `GET /files/:name/preview` - Inline preview (PDF data-URI, DOCX text+tables)
//! - `GET /files/:name/download` - Raw bytes with the original filename
//!
//! # Example
//!
//! ```no_run
//! use courseport::server::Server;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = Server::new(8655);
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use anyhow::Result;

use crate::auth::{SessionManager, Session, View};
use crate::config::Config;
use crate::errors::{PortalError, PortalResult};
use crate::render::{self, Preview};
use crate::source::{ContentSource, FileEntry};

// Maximum request body size (64KB); the only bodies accepted are tiny JSON.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server state shared across handlers.
pub struct AppState {
    /// Token-keyed login and navigation state.
    pub sessions: SessionManager,
    /// The configured content source.
    pub source: ContentSource,
    /// Whether DOCX files get a parsed preview or fall through to Unsupported.
    pub docx_preview: bool,
}

/// Portal server configuration.
#[derive(Debug)]
pub struct Server {
    /// Port to listen on.
    port: u16,
    /// Address to bind to (defaults to 127.0.0.1 for security).
    bind_address: String,
    /// Portal configuration (credentials, source, capabilities).
    config: Config,
}

impl Default for Server {
    fn default() -> Self {
        Self::new(8655)
    }
}

impl Server {
    /// Create a new server with the specified port and default configuration.
    /// By default, binds to 127.0.0.1 (localhost only) for security.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            bind_address: "127.0.0.1".to_string(),
            config: Config::default(),
        }
    }

    /// Set the portal configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address.
    /// Use "0.0.0.0" to allow network access, "127.0.0.1" (default) for localhost only.
    pub fn with_bind_address(mut self, addr: impl Into<String>) -> Self {
        self.bind_address = addr.into();
        self
    }

    /// Build the router with all routes.
    pub fn build_router(&self) -> Router {
        let source = self.config.source.build();
        let docx_preview = self.config.docx_preview_enabled();

        let state = Arc::new(AppState {
            sessions: SessionManager::new(self.config.credentials()),
            source,
            docx_preview,
        });

        router_with_state(state)
    }

    /// Start the server with graceful shutdown.
    pub async fn start(&self) -> Result<()> {
        let router = self.build_router();
        let addr = format!("{}:{}", self.bind_address, self.port);

        tracing::info!("Starting portal on {}", addr);

        if self.bind_address == "0.0.0.0" {
            tracing::warn!(
                "Server is binding to 0.0.0.0 which exposes the portal to the network. \
                Use 127.0.0.1 (default) for local-only access."
            );
        }

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                anyhow::anyhow!(
                    "Port {} is already in use. Another courseport instance may be running; \
                    stop it or pick a different port with: courseport serve --port <PORT>",
                    self.port
                )
            } else {
                anyhow::anyhow!("Failed to bind to {}: {}", addr, e)
            }
        })?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Get the port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Assemble the router over prepared state. Split out so tests can bind the
/// router to an ephemeral listener directly.
pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/session", get(session_handler))
        .route("/view", post(view_handler))
        .route("/files", get(files_handler))
        .route("/files/:name/preview", get(preview_handler))
        .route("/files/:name/download", get(download_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: &'static str,
    source: &'static str,
}

/// Login request.
#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Login response.
#[derive(Serialize)]
struct LoginResponse {
    token: String,
    view: View,
    logged_in: bool,
}

/// Logout response.
#[derive(Serialize)]
struct LogoutResponse {
    logged_in: bool,
}

/// Session state response.
#[derive(Serialize)]
struct SessionResponse {
    username: String,
    view: View,
    logged_in: bool,
}

/// View selection request.
#[derive(Deserialize)]
struct ViewRequest {
    view: View,
}

/// View selection response.
#[derive(Serialize)]
struct ViewResponse {
    view: View,
}

/// File listing response.
#[derive(Serialize)]
struct FilesResponse {
    files: Vec<FileEntry>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.kind(),
    })
}

/// Login handler. Bad credentials re-prompt with 401; nothing is locked out.
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> PortalResult<Json<LoginResponse>> {
    let token = state
        .sessions
        .login(&request.username, &request.password)
        .ok_or_else(|| PortalError::auth(format!("Bad credentials for user '{}'", request.username)))?;

    Ok(Json(LoginResponse {
        token,
        view: View::default(),
        logged_in: true,
    }))
}

/// Logout handler. Always lands in LoggedOut, from any view.
async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PortalResult<Json<LogoutResponse>> {
    let token = bearer_token(&headers)?;
    state.sessions.logout(token);
    Ok(Json(LogoutResponse { logged_in: false }))
}

/// Session state handler.
async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PortalResult<Json<SessionResponse>> {
    let session = authorize(&state, &headers)?;
    Ok(Json(SessionResponse {
        username: session.username,
        view: session.view,
        logged_in: session.logged_in,
    }))
}

/// View selection handler. Transitions between the three views are unguarded.
async fn view_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ViewRequest>,
) -> PortalResult<Json<ViewResponse>> {
    let token = bearer_token(&headers)?;
    let view = state
        .sessions
        .select_view(token, request.view)
        .ok_or_else(PortalError::not_logged_in)?;
    Ok(Json(ViewResponse { view }))
}

/// File listing handler. Recomputed on every request; an empty listing is a
/// normal response, not an error.
async fn files_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PortalResult<Json<FilesResponse>> {
    authorize(&state, &headers)?;
    let files = state.source.list_files().await?;
    Ok(Json(FilesResponse { files }))
}

/// Preview handler. A preview failure is 422; the download path still works.
async fn preview_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> PortalResult<Json<Preview>> {
    authorize(&state, &headers)?;

    let kind = crate::source::validate_name(&name)?;
    let bytes = state.source.fetch(&name).await?;
    let preview = render::preview(&bytes, kind, state.docx_preview)?;
    Ok(Json(preview))
}

/// Download handler. Raw byte passthrough with the original filename,
/// regardless of whether the kind has a preview path.
async fn download_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> PortalResult<Response> {
    authorize(&state, &headers)?;

    crate::source::validate_name(&name)?;
    let bytes = state.source.fetch(&name).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    let disposition = format!("attachment; filename=\"{}\"", name);
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((response_headers, bytes).into_response())
}

// =============================================================================
// Utilities
// =============================================================================

/// Pull the session token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> PortalResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(PortalError::not_logged_in)
}

/// Resolve the caller's session or fail as not logged in.
fn authorize(state: &AppState, headers: &HeaderMap) -> PortalResult<Session> {
    let token = bearer_token(headers)?;
    state
        .sessions
        .session(token)
        .ok_or_else(PortalError::not_logged_in)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    // On Unix, listen for SIGINT and SIGTERM
    // On Windows, fall back to Ctrl+C only
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt())
            .expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown...");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
    }

    tracing::info!("Shutting down portal");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = Server::new(3000);
        assert_eq!(server.port(), 3000);
    }

    #[test]
    fn test_server_default() {
        let server = Server::default();
        assert_eq!(server.port(), 8655);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());
    }
}
