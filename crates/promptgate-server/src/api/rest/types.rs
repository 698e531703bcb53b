//! REST API type definitions
//!
//! Request and response types for the REST API endpoints.

use super::auth::BearerAuth;
use crate::gateway::Gateway;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub auth: Arc<BearerAuth>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Template request payload
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateQuery {
    /// User query rendered into the template (required)
    pub query: String,

    /// Model override; anything other than a string is ignored
    #[serde(default, deserialize_with = "string_or_none")]
    pub model: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
