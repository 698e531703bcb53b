//! Request pipeline
//!
//! Ties the template registry, the backend client and the response projection
//! together. Everything held here is read-only after construction, so one
//! `Gateway` is shared by all in-flight requests.

use crate::config::GatewayConfig;
use crate::error::ServerError;
use anyhow::Result;
use promptgate_backend::{project, BackendClient, HttpBackendClient, RequestDefaults};
use promptgate_templates::TemplateRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Templated prompt gateway
pub struct Gateway {
    templates: Arc<TemplateRegistry>,
    backend: Arc<dyn BackendClient>,
    defaults: RequestDefaults,
    response_fields: Vec<String>,
    strip_newline: bool,
}

impl Gateway {
    /// Create a gateway from already-loaded collaborators
    pub fn new(
        config: &GatewayConfig,
        templates: Arc<TemplateRegistry>,
        backend: Arc<dyn BackendClient>,
    ) -> Self {
        Self {
            templates,
            backend,
            defaults: config.request_defaults(),
            response_fields: config.response_fields.clone(),
            strip_newline: config.strip_newline,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Render the prompt for `template_name`, or pass the query through when
    /// no such template is registered
    pub fn prompt_for(&self, template_name: &str, query: &str) -> Result<String, ServerError> {
        match self.templates.lookup(template_name) {
            Some(template) => Ok(template.render(query)?),
            None => {
                debug!("No template '{}', using the raw query as prompt", template_name);
                Ok(query.to_string())
            }
        }
    }

    /// Run one request through the pipeline
    ///
    /// Exactly one backend call is made; any failure ends this request only.
    pub async fn process(
        &self,
        template_name: &str,
        query: &str,
        model: Option<&str>,
    ) -> Result<Map<String, Value>, ServerError> {
        let prompt = self.prompt_for(template_name, query)?;

        let payload = self.defaults.build(&prompt, model);
        info!(
            "Forwarding prompt ({} chars) to {} backend with model {}",
            prompt.len(),
            self.backend.name(),
            payload.model().unwrap_or_default()
        );

        let raw = self.backend.send(&payload).await?;

        Ok(project(&raw, &self.response_fields, self.strip_newline)?)
    }
}

/// Initialize the gateway from configuration
///
/// Loads (and if needed bootstraps) the template directory and creates the
/// HTTP backend client. Any failure here is fatal for startup.
pub async fn init_gateway(config: &GatewayConfig) -> Result<Gateway> {
    let templates = TemplateRegistry::load_dir(&config.templates_dir).await?;
    info!("Loaded {} template(s)", templates.len());

    let backend = HttpBackendClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.request_timeout(),
    )?;
    info!(
        "Backend client ready: {} (timeout {}s)",
        config.api_url, config.request_timeout
    );

    Ok(Gateway::new(config, Arc::new(templates), Arc::new(backend)))
}
