//! REST API implementation
//!
//! Modular REST API with clean separation of concerns:
//! - types: Request/response type definitions
//! - extractors: Custom request extractors
//! - auth: Bearer token middleware guarding template routes
//! - handlers: API endpoint handlers
//! - router: Router creation and configuration
//! - tests: Unit tests for all components

mod auth;
mod extractors;
mod handlers;
mod router;
pub mod types;

// Re-export public API
pub use auth::BearerAuth;
pub use extractors::JsonExtractor;
pub use router::create_router;
pub use types::{AppState, HealthResponse, TemplateQuery};
