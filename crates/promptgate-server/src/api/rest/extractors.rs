//! Custom extractors
//!
//! Provides custom request extractors with better error handling.

use crate::error::ServerError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{error::Category, Map, Value};

/// JSON body extractor
///
/// Unlike `axum::Json` it does not insist on a `Content-Type` header, since
/// automation clients often omit it. The body must be a JSON object; arrays
/// and scalars are rejected before `T` is deserialized. Every failure is a 400.
pub struct JsonExtractor<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonExtractor<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ServerError::InvalidRequest(format!("Failed to read body: {}", e)))?;

        let object: Map<String, Value> = serde_json::from_slice(&body).map_err(invalid_json)?;

        serde_json::from_value(Value::Object(object))
            .map(Self)
            .map_err(invalid_json)
    }
}

fn invalid_json(err: serde_json::Error) -> ServerError {
    let message = match err.classify() {
        Category::Data => format!("Invalid JSON data: {}", err),
        Category::Syntax | Category::Eof => format!("JSON syntax error: {}", err),
        Category::Io => format!("Failed to parse JSON: {}", err),
    };
    ServerError::InvalidRequest(message)
}
