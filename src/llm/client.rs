// src/llm/client.rs
// Shared HTTP client for the OpenAI-compatible API

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Message;
use crate::error::{ChatError, Result};

/// Connect timeout; request timeouts are left to reqwest defaults
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into(),
        }
    }

    /// Full URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Request builder with bearer auth for JSON endpoints
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Run a chat completion and return the first choice's text
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .request(Method::POST, "chat/completions")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Llm(format!("API error {}: {}", status, error_text)));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Llm("no content in chat completion response".to_string()))
    }

    /// Embed a batch of texts, returning vectors in input order
    pub async fn embeddings(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .request(Method::POST, "embeddings")
            .json(&EmbeddingRequest { model, input: inputs })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Embedding(format!("API error {}: {}", status, error_text)));
        }

        let mut body: EmbeddingResponse = response.json().await?;
        if body.data.len() != inputs.len() {
            return Err(ChatError::Embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                body.data.len()
            )));
        }
        body.data.sort_by_key(|d| d.index);
        debug!("Embedded {} texts with {}", inputs.len(), model);

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_cleanly() {
        let client = OpenAIClient::new("sk-test", "https://api.openai.com/v1/");
        assert_eq!(client.url("/chat/completions"), "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.url("embeddings"), "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest::new("gpt-4o-mini", vec![Message::system("persona"), Message::user("otázka")])
            .with_temperature(0.4);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "otázka");
        assert!((json["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_chat_request_without_temperature() {
        let req = ChatRequest::new("gpt-4o-mini", vec![]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_parse_chat_response() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Ahoj"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Ahoj"));
    }

    #[test]
    fn test_parse_embedding_response() {
        let raw = r#"{"data":[{"embedding":[0.5,0.25],"index":1},{"embedding":[1.0,0.0],"index":0}],"model":"m"}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }
}
