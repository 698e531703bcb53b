//! Prompt templates for the promptgate gateway
//!
//! This crate owns the named prompt templates served by the gateway:
//!
//! - **Registry**: compiled templates keyed by name, read-only after startup
//! - **Rendering**: a template renders one input value, the user's `query`
//! - **Loading**: one template per file in a directory, with a persisted
//!   default template when the directory holds none
//!
//! # Quick Start
//!
//! ```no_run
//! use promptgate_templates::TemplateRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = TemplateRegistry::load_dir("templates").await?;
//!
//!     if let Some(template) = registry.lookup("default") {
//!         let prompt = template.render("Is the garage door open?")?;
//!         println!("{}", prompt);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file_system;
pub mod registry;

pub use error::{TemplateError, TemplateResult};
pub use file_system::TEMPLATE_EXTENSIONS;
pub use registry::{
    render, PromptTemplate, TemplateRegistry, DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE_SOURCE,
};
