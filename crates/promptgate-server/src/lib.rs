//! promptgate HTTP server library
//!
//! Provides the gateway pipeline and REST API components for testing and reuse.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
