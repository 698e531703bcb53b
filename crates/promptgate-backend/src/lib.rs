//! promptgate backend integration
//!
//! This crate talks to the generative-text backend on behalf of the gateway:
//! - Request building: static parameters + rendered prompt + selected model
//! - Transport: one authenticated POST per request with a hard deadline
//! - Projection: reduce the backend's JSON answer to the configured fields
//!
//! **Note**: there is no retry, batching or routing between backends. A failed
//! call fails the request that made it.

// Re-export core types
pub use client::{BackendClient, HttpBackendClient};
pub use error::{BackendError, Result};
pub use payload::{build_payload, select_model, BackendPayload, RequestDefaults};
pub use projector::{project, RESPONSE_KEY};

pub mod client;
pub mod error;
pub mod payload;
pub mod projector;
