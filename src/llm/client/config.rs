//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini generateContent API (default)
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
    /// Ollama API (local, no key)
    Ollama,
}

impl LlmProvider {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-pro",
            Self::OpenAI => "gpt-4o-mini",
            Self::Ollama => "llama3.1:8b",
        }
    }

    /// Environment variables that hold this provider's API key, in lookup order.
    /// Empty for providers that need no key.
    pub fn key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
            Self::Ollama => &[],
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !self.key_env_vars().is_empty()
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (gemini, openai or ollama)
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint; the provider's default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key for hosted providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name; the provider's default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum characters of book text to send to the LLM
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// HTTP timeout for a single generation request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_content_chars() -> usize {
    30_000
}

fn default_timeout_secs() -> u64 {
    300
}

impl LlmConfig {
    /// Defaults before any file or environment overrides.
    pub fn base_default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_content_chars: default_max_content_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a fixed table in tests).
    ///
    /// Supported variables:
    /// - `LLM_PROVIDER`: "gemini" (default), "openai", "groq", "together" or "ollama"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for any provider
    /// - `GOOGLE_API_KEY` / `GEMINI_API_KEY`: Gemini key when `LLM_API_KEY` is unset
    /// - `OPENAI_API_KEY`: OpenAI key when `LLM_API_KEY` is unset
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_MAX_CONTENT_CHARS`: Max book characters to send
    /// - `LLM_TIMEOUT_SECS`: Request timeout
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(provider) = lookup("LLM_PROVIDER").and_then(|v| LlmProvider::from_str(&v)) {
            self.provider = provider;
        }
        if let Some(endpoint) = lookup("LLM_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }

        // Explicit key wins, then the provider's own variable
        if let Some(key) = lookup("LLM_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = self
                .provider
                .key_env_vars()
                .iter()
                .find_map(|var| lookup(var));
        }

        if let Some(model) = lookup("LLM_MODEL") {
            self.model = Some(model);
        }
        if let Some(n) = lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = n;
        }
        if let Some(t) = lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = t;
        }
        if let Some(n) = lookup("LLM_MAX_CONTENT_CHARS").and_then(|v| v.parse().ok()) {
            self.max_content_chars = n;
        }
        if let Some(n) = lookup("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = n;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Endpoint to call, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    /// Model to request.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or(self.provider.default_model())
    }

    /// Whether requests can be made (a key is present or not needed).
    pub fn has_credentials(&self) -> bool {
        !self.provider.requires_api_key() || self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Message returned instead of a summary when no key is configured.
    pub fn missing_key_message(&self) -> String {
        let var = self
            .provider
            .key_env_vars()
            .first()
            .copied()
            .unwrap_or("LLM_API_KEY");
        format!("API key not configured. Please set the {var} environment variable.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_base_default() {
        let config = LlmConfig::base_default();
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.model(), "gemini-1.5-pro");
        assert_eq!(config.max_content_chars, 30_000);
        assert!(!config.has_credentials());
        assert_eq!(
            config.missing_key_message(),
            "API key not configured. Please set the GOOGLE_API_KEY environment variable."
        );
    }

    #[test]
    fn test_google_key_is_picked_up_for_gemini() {
        let config = LlmConfig::base_default().with_overrides_from(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "o-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("g-key"));
        assert!(config.has_credentials());
    }

    #[test]
    fn test_provider_override_selects_provider_key_and_defaults() {
        let config = LlmConfig::base_default().with_overrides_from(lookup(&[
            ("LLM_PROVIDER", "openai"),
            ("GOOGLE_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "o-key"),
            ("LLM_MAX_CONTENT_CHARS", "500"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.api_key.as_deref(), Some("o-key"));
        assert_eq!(config.endpoint(), "https://api.openai.com");
        assert_eq!(config.max_content_chars, 500);
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = LlmConfig::base_default()
            .with_overrides_from(lookup(&[("LLM_PROVIDER", "ollama")]));
        assert!(config.has_credentials());
        assert_eq!(config.endpoint(), "http://localhost:11434");
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let config = LlmConfig::base_default().with_endpoint("http://127.0.0.1:8080/");
        assert_eq!(config.endpoint(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: LlmConfig = toml::from_str("provider = \"ollama\"\nmodel = \"mistral\"").unwrap();
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.model(), "mistral");
        assert_eq!(config.max_tokens, 2048);
    }
}
