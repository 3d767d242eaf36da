// Router setup
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    blur_field, calculate, edit_field, estimate, health_check, new_session, reset, show_session,
    validate_value,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/", get(new_session))
        .route("/sessions/:id", get(show_session))
        .route("/sessions/:id/fields/:field", post(edit_field))
        .route("/sessions/:id/fields/:field/blur", post(blur_field))
        .route("/sessions/:id/calculate", post(calculate))
        .route("/sessions/:id/reset", post(reset))
        .route("/api/validate", post(validate_value))
        .route("/api/estimate", post(estimate))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
