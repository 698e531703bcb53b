//! API endpoint handlers
//!
//! HTTP request handlers for all REST API endpoints.

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};
use tracing::{error, info};

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Template endpoint: render the query, call the backend, return the filtered answer
#[tracing::instrument(
    name = "template_request",
    skip_all,
    fields(template = %name, request_id = %uuid::Uuid::new_v4())
)]
pub(super) async fn run_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    JsonExtractor(payload): JsonExtractor<TemplateQuery>,
) -> Result<Json<Map<String, Value>>, ServerError> {
    if !state.gateway.templates().contains(&name) {
        return Err(ServerError::NotFound(format!("template '{}'", name)));
    }

    info!(
        "Received query ({} chars), model override: {:?}",
        payload.query.len(),
        payload.model
    );

    let filtered = state
        .gateway
        .process(&name, &payload.query, payload.model.as_deref())
        .await
        .map_err(|e| {
            error!("Request failed: {}", e);
            e
        })?;

    Ok(Json(filtered))
}
