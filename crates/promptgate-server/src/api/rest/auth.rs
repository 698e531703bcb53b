//! Bearer token authentication for template routes

use super::types::AppState;
use crate::error::ServerError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::{info, warn};

/// Shared-token bearer authentication
#[derive(Clone)]
pub struct BearerAuth {
    expected: String,
}

impl BearerAuth {
    pub fn new(token: &str) -> Self {
        Self {
            expected: format!("Bearer {}", token),
        }
    }

    /// Exact comparison of a presented `Authorization` value
    pub fn matches(&self, presented: &str) -> bool {
        presented == self.expected
    }
}

/// Last character of a presented token; the only part that may be logged
pub(super) fn token_hint(presented: &str) -> String {
    presented
        .chars()
        .last()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}

fn caller(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware rejecting requests without the configured bearer token
pub(super) async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.auth.matches(presented) {
        warn!(
            "Unauthorized access attempt from token ending in: '{}', from: {}",
            token_hint(presented),
            caller(&req)
        );
        return ServerError::Unauthorized.into_response();
    }

    info!("Successful authentication from: {}", caller(&req));
    next.run(req).await
}
