//! Backend request payload construction
//!
//! The static parameters from configuration are treated as an immutable
//! template: every request gets its own copy before `prompt` and `model`
//! are written into it.

use crate::error::{BackendError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding the rendered prompt
pub const PROMPT_KEY: &str = "prompt";

/// Key holding the selected model
pub const MODEL_KEY: &str = "model";

/// Key holding the system prompt
pub const SYSTEM_KEY: &str = "system";

/// Per-process request defaults shared by every backend call
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    /// Static parameters merged into every request
    pub params: Map<String, Value>,

    /// Model used when the request does not name one
    pub default_model: String,

    /// System prompt sent when `params` does not already carry one
    pub system_prompt: Option<String>,
}

impl RequestDefaults {
    /// Create defaults with the given default model and no static parameters
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            params: Map::new(),
            default_model: default_model.into(),
            system_prompt: None,
        }
    }

    /// Set static parameters
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Set system prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Build the payload for one request
    pub fn build(&self, prompt: &str, requested_model: Option<&str>) -> BackendPayload {
        build_payload(self, prompt, requested_model)
    }
}

/// JSON object sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BackendPayload(Map<String, Value>);

impl BackendPayload {
    /// Selected model
    pub fn model(&self) -> Option<&str> {
        self.0.get(MODEL_KEY).and_then(Value::as_str)
    }

    /// Rendered prompt
    pub fn prompt(&self) -> Option<&str> {
        self.0.get(PROMPT_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Encode the payload as a JSON request body
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(BackendError::Serialization)
    }
}

/// Pick the request's model when it names a non-empty one, otherwise the default
pub fn select_model<'a>(requested: Option<&'a str>, default_model: &'a str) -> &'a str {
    match requested {
        Some(model) if !model.is_empty() => model,
        _ => default_model,
    }
}

/// Merge static parameters, the rendered prompt and the selected model
///
/// `prompt` and `model` always overwrite whatever the static parameters hold
/// under those keys; every other key passes through unchanged.
pub fn build_payload(
    defaults: &RequestDefaults,
    prompt: &str,
    requested_model: Option<&str>,
) -> BackendPayload {
    let model = select_model(requested_model, &defaults.default_model);

    let mut params = defaults.params.clone();

    if let Some(system) = defaults.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        if !params.contains_key(SYSTEM_KEY) {
            params.insert(SYSTEM_KEY.to_string(), Value::String(system.to_string()));
        }
    }

    params.insert(PROMPT_KEY.to_string(), Value::String(prompt.to_string()));
    params.insert(MODEL_KEY.to_string(), Value::String(model.to_string()));

    BackendPayload(params)
}
