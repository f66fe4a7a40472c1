//! LLM client for book summarization.
//!
//! Supports the Gemini generateContent API, OpenAI-compatible chat
//! completions and Ollama.

mod config;
mod prompts;

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{LlmError, Summarizer, SummaryOutput};
use crate::models::SummaryTier;

pub use config::{LlmConfig, LlmProvider};
pub use prompts::{build_prompt, tier_prompt};

/// Appended to book text cut at the configured ceiling.
pub const TRUNCATION_SUFFIX: &str = "... (text truncated)";

/// LLM client for summary generation.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI chat completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// OpenAI chat completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Cut text to the configured character ceiling (UTF-8 safe), marking the cut.
    pub fn truncate_content<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match text.char_indices().nth(self.config.max_content_chars) {
            Some((end, _)) => Cow::Owned(format!("{}{}", &text[..end], TRUNCATION_SUFFIX)),
            None => Cow::Borrowed(text),
        }
    }

    /// Send a prompt to the configured provider and return the raw completion.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match self.config.provider {
            LlmProvider::Gemini => self.call_gemini(prompt).await,
            LlmProvider::OpenAI => self.call_openai(prompt).await,
            LlmProvider::Ollama => self.call_ollama(prompt).await,
        }
    }

    /// Call the Gemini generateContent API.
    async fn call_gemini(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint(),
            self.config.model()
        );
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_deref().unwrap_or_default())])
            .json(&request)
            .send()
            .await
            .map_err(connection_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let gemini_resp: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(error) = gemini_resp.error {
            return Err(LlmError::Api(error.message));
        }

        let candidate = gemini_resp
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| LlmError::Parse("Gemini returned no candidates".to_string()))?;

        Ok(candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    /// Call an OpenAI-compatible chat completions API.
    async fn call_openai(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model().to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint());
        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let resp = builder.send().await.map_err(connection_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(error) = chat_resp.error {
            return Err(LlmError::Api(error.message));
        }

        chat_resp
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: self.config.model().to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint());
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(connection_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }
}

/// Request errors carry the URL, which holds the Gemini key; drop it.
fn connection_error(e: reqwest::Error) -> LlmError {
    LlmError::Connection(e.without_url().to_string())
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn summarize(&self, text: &str, tier: SummaryTier) -> Result<SummaryOutput, LlmError> {
        if !self.config.has_credentials() {
            return Ok(SummaryOutput::placeholder(self.config.missing_key_message()));
        }

        let content = self.truncate_content(text);
        let prompt = build_prompt(tier, &content);

        info!(
            "Generating {} summary with {} ({} chars)",
            tier,
            self.config.model(),
            content.chars().count()
        );
        let response = self.generate(&prompt).await?;

        let summary = response.trim().to_string();
        if summary.is_empty() {
            return Err(LlmError::Parse("Empty summary response".to_string()));
        }
        debug!("Received {} chars of {} summary", summary.len(), tier);

        Ok(SummaryOutput::generated(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn fake_gemini(
        State(captured): State<Captured>,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        assert_eq!(query.get("key").map(String::as_str), Some("test-key"));
        captured.lock().unwrap().push(body);
        Json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  A tidy summary.  " }] } }]
        }))
    }

    fn gemini_config(endpoint: &str) -> LlmConfig {
        let mut config = LlmConfig::base_default()
            .with_endpoint(endpoint)
            .with_api_key("test-key");
        config.max_content_chars = 10;
        config
    }

    #[test]
    fn test_truncate_content() {
        let mut config = LlmConfig::base_default();
        config.max_content_chars = 5;
        let client = LlmClient::new(config);

        assert_eq!(client.truncate_content("short"), "short");
        assert_eq!(
            client.truncate_content("longer text"),
            format!("longe{TRUNCATION_SUFFIX}")
        );
        // Character, not byte, boundaries
        assert_eq!(
            client.truncate_content("ééééééé"),
            format!("ééééé{TRUNCATION_SUFFIX}")
        );
    }

    #[tokio::test]
    async fn test_missing_key_returns_placeholder_without_request() {
        // Unroutable endpoint: any request would fail
        let config = LlmConfig::base_default().with_endpoint("http://127.0.0.1:9");
        let client = LlmClient::new(config);

        let output = client.summarize("some text", SummaryTier::Short).await.unwrap();
        assert!(!output.generated);
        assert!(output.text.contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn test_gemini_request_is_truncated_and_response_trimmed() {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route("/v1beta/models/:action", post(fake_gemini))
            .with_state(captured.clone());
        let endpoint = spawn_server(app).await;

        let client = LlmClient::new(gemini_config(&endpoint));
        let output = client
            .summarize("abcdefghijklmnopqrstuvwxyz", SummaryTier::Brief)
            .await
            .unwrap();

        assert!(output.generated);
        assert_eq!(output.text, "A tidy summary.");

        let bodies = captured.lock().unwrap();
        let prompt = bodies[0]["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert_eq!(
            prompt,
            format!("{}\n\nabcdefghij{}", prompts::BRIEF_PROMPT, TRUNCATION_SUFFIX)
        );
        assert_eq!(bodies[0]["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[tokio::test]
    async fn test_gemini_error_status_is_api_error() {
        let app = Router::new().route(
            "/v1beta/models/:action",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({ "error": { "message": "API key not valid" } })),
                )
            }),
        );
        let endpoint = spawn_server(app).await;

        let client = LlmClient::new(gemini_config(&endpoint));
        let err = client
            .summarize("text", SummaryTier::Short)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api(ref msg) if msg.contains("API key not valid")));
    }

    #[tokio::test]
    async fn test_ollama_provider() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], false);
                Json(json!({ "response": "Local summary", "done": true }))
            }),
        );
        let endpoint = spawn_server(app).await;

        let mut config = LlmConfig::base_default().with_endpoint(&endpoint);
        config.provider = LlmProvider::Ollama;
        let client = LlmClient::new(config);

        let output = client
            .summarize("text", SummaryTier::Detailed)
            .await
            .unwrap();
        assert_eq!(output, SummaryOutput::generated("Local summary"));
    }

    #[tokio::test]
    async fn test_openai_provider_sends_bearer_key() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: axum::http::HeaderMap| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer sk-test")
                );
                Json(json!({ "choices": [{ "message": { "content": "Chat summary" } }] }))
            }),
        );
        let endpoint = spawn_server(app).await;

        let mut config = LlmConfig::base_default()
            .with_endpoint(&endpoint)
            .with_api_key("sk-test");
        config.provider = LlmProvider::OpenAI;
        let client = LlmClient::new(config);

        let output = client.summarize("text", SummaryTier::Short).await.unwrap();
        assert_eq!(output.text, "Chat summary");
    }
}
