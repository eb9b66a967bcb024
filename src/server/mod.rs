//! HTTP server for the cached data and the dashboard
//!
//! Serves the cache file at `/weather_data.json`, a rendered dashboard at `/`,
//! the refresher status at `/api/status`, and static files from a root
//! directory for every other path.

pub mod pages;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::cache::CacheError;
use crate::data::WeatherSource;
use crate::error::{AppError, Result};
use crate::refresh::{RefreshStatus, Refresher, Scheduler};
use crate::view::Filters;

/// Cache policy for the data file
const DATA_CACHE_CONTROL: &str = "no-cache";
/// Cache policy for everything else under the root
const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Shared server state
pub struct AppState<S> {
    pub refresher: Arc<Refresher<S>>,
    /// Directory static files are served from
    pub root: PathBuf,
    /// Whether reads of the data file first run the staleness check
    pub auto_refresh: bool,
    /// Background timer; `/api/status` reports whether it is alive
    pub scheduler: Mutex<Scheduler>,
}

/// Create the web application router
pub fn create_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: WeatherSource + 'static,
{
    Router::new()
        .route("/", get(dashboard::<S>))
        .route("/weather_data.json", get(weather_data::<S>))
        .route("/api/status", get(api_status::<S>))
        .fallback(static_file::<S>)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until `shutdown` completes
pub async fn start_server<S, F>(addr: &str, state: Arc<AppState<S>>, shutdown: F) -> Result<()>
where
    S: WeatherSource + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard available at http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}

// === Handlers ===

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    #[serde(default)]
    province: String,
    #[serde(default)]
    q: String,
}

async fn dashboard<S: WeatherSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let filters = Filters::new(query.province, &query.q);
    match state.refresher.store().read_async().await {
        Ok(envelope) => Html(pages::dashboard_page(&envelope, &filters, Utc::now())),
        Err(e) => {
            error!(error = %e, "Failed to load cached data for dashboard");
            Html(pages::load_error_page(&e.to_string()))
        }
    }
}

async fn weather_data<S: WeatherSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Response {
    if state.auto_refresh {
        state.refresher.maybe_refresh().await;
    }

    match state.refresher.store().read_bytes_async().await {
        Ok(bytes) => {
            debug!("Served weather_data.json");
            file_response(bytes, "application/json", DATA_CACHE_CONTROL)
        }
        Err(CacheError::Missing(_)) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to read cache file");
            server_error()
        }
    }
}

async fn api_status<S: WeatherSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<RefreshStatus> {
    let running = state.scheduler.lock().await.is_running();
    Json(state.refresher.status(running).await)
}

async fn static_file<S: WeatherSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    uri: Uri,
) -> Response {
    let Some(path) = resolve_path(&state.root, uri.path()) else {
        return not_found();
    };
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(),
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_type(&path);
            debug!(path = uri.path(), mime, "Served static file");
            file_response(bytes, mime, STATIC_CACHE_CONTROL)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(),
        Err(e) => {
            error!(error = %e, path = %path.display(), "Failed to read file");
            server_error()
        }
    }
}

// === Helpers ===

/// Maps a request path onto the root directory
///
/// Returns `None` for paths that would leave the root.
fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') => return None,
            s => path.push(s),
        }
    }
    Some(path)
}

/// Content type from the file extension
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn file_response(bytes: Vec<u8>, mime: &'static str, cache_control: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
            (header::CACHE_CONTROL, HeaderValue::from_static(cache_control)),
        ],
        bytes,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page())).into_response()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error_page())).into_response()
}
