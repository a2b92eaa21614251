//! Model endpoint configuration (layered: code > env > defaults).

use crate::llm::SamplingSettings;

/// Default model served by a local Ollama instance.
pub const DEFAULT_MODEL: &str = "qwen2.5:32b";

/// Default OpenAI-compatible endpoint of a local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434/v1";

/// Placeholder key for endpoints that do not check credentials.
pub const DEFAULT_API_KEY: &str = "EMPTY";

/// Configuration for the chat model endpoint.
///
/// Resolution order: explicit setters, then environment variables
/// (`ROUNDTABLE_MODEL`, `ROUNDTABLE_BASE_URL`, `ROUNDTABLE_API_KEY`),
/// then local-server defaults.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub sampling: SamplingSettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            sampling: SamplingSettings::builder().top_p(0.8).build(),
        }
    }
}

impl ModelConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();

        if let Ok(model) = std::env::var("ROUNDTABLE_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("ROUNDTABLE_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(key) = std::env::var("ROUNDTABLE_API_KEY") {
            config.api_key = key;
        }

        config
    }

    /// Set the model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set sampling settings.
    pub fn with_sampling(mut self, sampling: SamplingSettings) -> Self {
        self.sampling = sampling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let config = ModelConfig::new();

        assert_eq!(config.model, "qwen2.5:32b");
        assert_eq!(config.base_url, "http://127.0.0.1:11434/v1");
        assert_eq!(config.api_key, "EMPTY");
        assert_eq!(config.sampling.top_p, Some(0.8));
    }

    #[test]
    fn explicit_setters_override_defaults() {
        let config = ModelConfig::new()
            .with_model("qwen-max")
            .with_base_url("https://dashscope.example/v1")
            .with_api_key("secret");

        assert_eq!(config.model, "qwen-max");
        assert_eq!(config.base_url, "https://dashscope.example/v1");
        assert_eq!(config.api_key, "secret");
    }
}
