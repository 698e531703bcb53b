//! Router creation and configuration
//!
//! Creates Axum routers for REST API endpoints.

use super::auth::{require_bearer, BearerAuth};
use super::handlers::*;
use super::types::AppState;
use crate::gateway::Gateway;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create REST API router
///
/// `POST /template/:name` is dispatched by template name and guarded by the
/// bearer token; `/health` is open.
pub fn create_router(gateway: Arc<Gateway>, auth_token: &str) -> Router {
    let state = AppState {
        gateway,
        auth: Arc::new(BearerAuth::new(auth_token)),
    };

    let templates = Router::new()
        .route("/template/:name", post(run_template))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(templates)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
