mod error;
mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, info_span, warn};

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::media::PUBLIC_PREFIX;

pub use error::ApiError;

/// Headroom for the text fields and multipart framing around the files
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: CatalogService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let max_file_bytes = state.service.media().max_file_bytes();
    let body_limit = usize::try_from(
        max_file_bytes
            .saturating_mul(2)
            .saturating_add(FORM_OVERHEAD_BYTES),
    )
    .unwrap_or(usize::MAX);

    let uploads = ServeDir::new(state.service.media().root());

    let mut app = Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/podcasts",
            get(routes::list)
                .post(routes::create)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/podcasts/user/:user_id", get(routes::list_by_author))
        .route(
            "/api/podcasts/:id",
            get(routes::get).delete(routes::delete),
        )
        .route("/api/podcasts/:id/feed", get(routes::feed))
        .nest_service(PUBLIC_PREFIX, uploads);

    app = match state.config.http.frontend_dir.as_deref() {
        Some(dir) if dir.is_dir() => app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        Some(dir) => {
            warn!("Frontend directory {} does not exist, not serving it", dir.display());
            app.fallback(routes::not_found)
        }
        None => app.fallback(routes::not_found),
    };

    let cors = if state.config.http.cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    app.with_state(state).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                info_span!(
                    "http_request",
                    method = ?request.method(),
                    uri = ?request.uri(),
                )
            })
            .on_response(DefaultOnResponse::new().level(Level::INFO))
            .on_failure(DefaultOnFailure::new().level(Level::WARN)),
    )
}
