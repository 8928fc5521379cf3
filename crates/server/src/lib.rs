//! HTTP host for the loan assistant: chat API, mock collaborator services and health.

pub mod api;
pub mod bootstrap;
pub mod gateway_client;
pub mod health;
pub mod llm_client;
pub mod mock_services;
pub mod sanction_letter;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use bootstrap::Application;

/// Combined router for every surface the server exposes.
pub fn router(app: &Application) -> Router {
    Router::new()
        .merge(api::router(app.assistant.clone()))
        .merge(mock_services::router(app.dataset.clone()))
        .merge(health::router(app.health_state()))
        .layer(cors_layer(app.config.server.frontend_origin.as_deref()))
}

fn cors_layer(frontend_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    match frontend_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(error)) => {
            warn!(
                event_name = "system.server.invalid_origin",
                error = %error,
                "frontend origin is not a valid header value, allowing any origin"
            );
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
