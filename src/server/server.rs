use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

use tracing::{error, info};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use super::{
    http_cache, log_requests, metrics::metrics_handler, state::*, PageCache, ServerConfig,
};
use crate::album::AlbumFilter;
use crate::sync::AlbumService;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn default_include_tracks() -> bool {
    true
}

#[derive(Deserialize, Debug)]
struct AlbumsQuery {
    #[serde(default)]
    pub sync: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_include_tracks")]
    pub include_tracks: bool,
}

#[derive(Deserialize, Debug)]
struct RevalidateQuery {
    pub secret: Option<String>,
}

#[derive(Serialize)]
struct RevalidateResponse {
    revalidated: bool,
    inserted: usize,
    deleted: usize,
    skipped: usize,
    total: usize,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn get_albums(
    State(album_service): State<GuardedAlbumService>,
    Query(params): Query<AlbumsQuery>,
) -> Response {
    let result = if params.sync {
        album_service.get_albums().await
    } else {
        album_service.get_albums_from_cache().await
    };

    match result {
        Ok(albums) => {
            let filter = AlbumFilter::new(params.query, params.include_tracks);
            Json(filter.apply(albums)).into_response()
        }
        Err(err) => {
            error!("Error loading albums: {:#}", anyhow::Error::new(err));
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading albums").into_response()
        }
    }
}

/// Compare without stopping at the first differing byte. Only the length
/// leaks through timing.
fn secret_matches(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

async fn revalidate(
    State(state): State<ServerState>,
    Query(params): Query<RevalidateQuery>,
) -> Response {
    let authorized = params
        .secret
        .as_deref()
        .is_some_and(|secret| secret_matches(secret, &state.config.revalidate_token));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(MessageResponse {
                message: "Invalid token",
            }),
        )
            .into_response();
    }

    match state.page_cache.revalidate(&state.album_service).await {
        Ok(report) => Json(RevalidateResponse {
            revalidated: true,
            inserted: report.inserted,
            deleted: report.deleted,
            skipped: report.skipped,
            total: report.total,
        })
        .into_response(),
        Err(err) => {
            error!("Error revalidating: {:#}", anyhow::Error::new(err));
            (StatusCode::INTERNAL_SERVER_ERROR, "Error revalidating").into_response()
        }
    }
}

async fn get_collection(State(state): State<ServerState>) -> Response {
    let snapshot = state.page_cache.get_or_build(&state.album_service).await;
    Json(snapshot.as_ref()).into_response()
}

pub fn make_app(
    config: ServerConfig,
    album_service: Arc<AlbumService>,
    page_cache: Arc<PageCache>,
) -> Router {
    let state = ServerState::new(config.clone(), album_service, page_cache);

    let api_routes: Router = Router::new()
        .route("/albums", get(get_albums))
        .route("/revalidate", get(revalidate).post(revalidate))
        .with_state(state.clone());

    let page_routes: Router = Router::new()
        .route("/collection", get(get_collection))
        .layer(middleware::from_fn_with_state(
            config.content_cache_age_sec,
            http_cache,
        ))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/api", api_routes.merge(page_routes))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve the API and the metrics endpoint until either listener fails.
pub async fn run_server(
    config: ServerConfig,
    album_service: Arc<AlbumService>,
    page_cache: Arc<PageCache>,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, album_service, page_cache);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Could not bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::try_join!(
        async { axum::serve(listener, app).await.context("HTTP server failed") },
        async {
            axum::serve(metrics_listener, make_metrics_app())
                .await
                .context("Metrics server failed")
        },
    )?;
    Ok(())
}
