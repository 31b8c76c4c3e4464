//! Router assembly: the REST-ish API, the WebSocket endpoint, static SPA
//! delivery, CORS, and per-request tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router: WebSocket at `/ws`, the API under
/// `/api/v1/...`, and the SPA served from `./static` with an `index.html`
/// fallback. CORS allows any origin/method/headers – tighten for production.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Unmatched paths fall through to the drop-in SPA.
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/ingest", post(http::http_post_ingest))
        .route("/api/v1/drill", get(http::http_get_drill))
        .route("/api/v1/drill/submit", post(http::http_post_submit))
        .route("/api/v1/drill/advance", post(http::http_post_advance))
        .route("/api/v1/drill/restart", post(http::http_post_restart))
        .route("/api/v1/mistakes", get(http::http_get_mistakes))
        .route("/api/v1/mistakes/forget", post(http::http_post_forget))
        .with_state(state)
        // ServiceBuilder applies top-down: tracing outermost, CORS inside it.
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_assembles_with_the_full_middleware_stack() {
        let state = Arc::new(AppState::new().expect("app state"));
        let _router = build_router(state);
    }
}
