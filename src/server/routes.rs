//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/summary/:id", get(handlers::summary_detail))
        .route("/upload", post(handlers::upload))
        .route("/generate_summary", post(handlers::generate_summary))
        .route("/api/recent", get(handlers::api_recent))
        // Static assets (CSS/JS)
        .route("/static/style.css", get(handlers::serve_css))
        .route("/static/app.js", get(handlers::serve_js));

    if state.settings.dev_routes {
        router = router.route("/test_summary", post(handlers::test_summary));
    }

    let body_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);

    router
        .fallback(handlers::not_found)
        .layer(body_limit)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
