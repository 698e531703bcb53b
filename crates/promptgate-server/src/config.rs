//! Gateway configuration

use anyhow::{anyhow, bail};
use promptgate_backend::RequestDefaults;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "PROMPTGATE_CONFIG";

/// Prefix of environment variables overriding file settings
pub const ENV_PREFIX: &str = "PROMPTGATE";

fn default_server_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

/// Gateway configuration
///
/// Read once at startup and never mutated afterwards.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_server_address")]
    pub server_address: String,

    /// Backend generate endpoint
    pub api_url: String,

    /// Backend credential, sent as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Default system prompt forwarded to the backend (optional)
    #[serde(default)]
    pub system_prompt: String,

    /// Token clients must present as `Authorization: Bearer <token>`
    pub auth_token: String,

    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Static parameters merged into every backend request
    #[serde(default, alias = "backend_params")]
    pub ollama_params: Map<String, Value>,

    /// Backend response fields returned in addition to `response`
    #[serde(default)]
    pub response_fields: Vec<String>,

    /// Backend request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Replace newlines in `response` with spaces
    #[serde(default)]
    pub strip_newline: bool,

    /// Directory holding one template file per route
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            api_url: "http://localhost:11434/api/generate".to_string(),
            api_key: String::new(),
            system_prompt: String::new(),
            auth_token: String::new(),
            default_model: default_model(),
            ollama_params: Map::new(),
            response_fields: Vec::new(),
            request_timeout: default_request_timeout(),
            strip_newline: false,
            templates_dir: default_templates_dir(),
        }
    }
}

// Credentials never reach the logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("server_address", &self.server_address)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("system_prompt", &self.system_prompt)
            .field("auth_token", &redact(&self.auth_token))
            .field("default_model", &self.default_model)
            .field("ollama_params", &self.ollama_params)
            .field("response_fields", &self.response_fields)
            .field("request_timeout", &self.request_timeout)
            .field("strip_newline", &self.strip_newline)
            .field("templates_dir", &self.templates_dir)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl GatewayConfig {
    /// Load configuration from `.env`, the config file and environment variables
    ///
    /// The file is named by `PROMPTGATE_CONFIG` (default `config`, any format
    /// the `config` crate recognizes by extension, e.g. `config.json`).
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from(&path)
    }

    /// Load configuration from the given file, layered with environment variables
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("response_fields"),
            )
            .build()
            .map_err(|e| anyhow!("Failed to load server configuration: {}", e))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| anyhow!("Failed to deserialize config: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the gateway cannot serve with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        if self.auth_token.is_empty() {
            bail!("auth_token must not be empty");
        }
        if self.default_model.trim().is_empty() {
            bail!("default_model must not be empty");
        }
        if self.request_timeout == 0 {
            bail!("request_timeout must be greater than zero");
        }
        Ok(())
    }

    /// Backend request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Static request defaults handed to the backend payload builder
    pub fn request_defaults(&self) -> RequestDefaults {
        let defaults =
            RequestDefaults::new(self.default_model.clone()).with_params(self.ollama_params.clone());

        if self.system_prompt.is_empty() {
            defaults
        } else {
            defaults.with_system_prompt(self.system_prompt.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> GatewayConfig {
        GatewayConfig {
            auth_token: "local-token".to_string(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_gateway_config_default() {
        let config = GatewayConfig::default();

        assert_eq!(config.server_address, "127.0.0.1:8080");
        assert_eq!(config.default_model, "llama3");
        assert_eq!(config.request_timeout, 30);
        assert!(!config.strip_newline);
        assert!(config.response_fields.is_empty());
        assert!(config.ollama_params.is_empty());
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_auth_token() {
        let err = GatewayConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("auth_token"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = GatewayConfig {
            request_timeout: 0,
            ..valid()
        };
        assert!(config.validate().unwrap_err().to_string().contains("request_timeout"));
    }

    #[test]
    fn test_validate_rejects_empty_api_url() {
        let config = GatewayConfig {
            api_url: "  ".to_string(),
            ..valid()
        };
        assert!(config.validate().unwrap_err().to_string().contains("api_url"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = GatewayConfig {
            api_key: "backend-secret".to_string(),
            ..valid()
        };
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("GatewayConfig"));
        assert!(!debug_str.contains("backend-secret"));
        assert!(!debug_str.contains("local-token"));
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    fn test_request_defaults_carry_params_and_system_prompt() {
        let config = GatewayConfig {
            ollama_params: json!({"stream": false}).as_object().unwrap().clone(),
            system_prompt: "Answer briefly.".to_string(),
            default_model: "mistral".to_string(),
            ..valid()
        };

        let payload = config.request_defaults().build("hi", None);

        assert_eq!(payload.model(), Some("mistral"));
        assert_eq!(payload.get("stream"), Some(&json!(false)));
        assert_eq!(payload.get("system"), Some(&json!("Answer briefly.")));
    }

    #[test]
    fn test_request_timeout_duration() {
        let config = GatewayConfig {
            request_timeout: 45,
            ..valid()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(45));
    }
}
