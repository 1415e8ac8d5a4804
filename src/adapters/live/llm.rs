//! Live adapter for the `LlmClient` port using the Anthropic messages API.

use std::env;
use std::error::Error;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

type BoxError = Box<dyn Error + Send + Sync>;

/// Calls the Anthropic messages API.
///
/// Reads `ANTHROPIC_API_KEY` per request; `ANTHROPIC_BASE_URL` overrides the
/// endpoint.
pub struct LiveLlmClient {
    client: Client,
    url: String,
}

impl LiveLlmClient {
    /// Creates a client for the default or overridden endpoint.
    #[must_use]
    pub fn new() -> Self {
        let url = env::var("ANTHROPIC_BASE_URL")
            .map_or_else(|_| DEFAULT_API_URL.to_string(), |base| messages_url(&base));
        Self { client: Client::new(), url }
    }
}

impl Default for LiveLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

fn messages_url(base: &str) -> String {
    format!("{}/v1/messages", base.trim_end_matches('/'))
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl LlmClient for LiveLlmClient {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let api_key = env::var("ANTHROPIC_API_KEY")
                .map_err(|_| BoxError::from("ANTHROPIC_API_KEY environment variable not set"))?;

            let body = MessagesRequest {
                model: &request.model,
                max_tokens: request.max_tokens,
                temperature: request.temperature,
                system: request.system.as_deref(),
                messages: [Message { role: "user", content: &request.prompt }],
            };

            tracing::debug!(model = %request.model, url = %self.url, "sending completion request");
            let response = self
                .client
                .post(&self.url)
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await
                .map_err(|e| BoxError::from(format!("Anthropic API request failed: {e}")))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| BoxError::from(format!("Failed to read Anthropic response: {e}")))?;

            if !status.is_success() {
                let msg = serde_json::from_str::<ApiError>(&text)
                    .map(|e| e.error.message)
                    .unwrap_or(text);
                return Err(format!("Anthropic API error ({}): {msg}", status.as_u16()).into());
            }

            let parsed: MessagesResponse = serde_json::from_str(&text)
                .map_err(|e| BoxError::from(format!("Failed to parse Anthropic response: {e}")))?;

            Ok(CompletionResponse {
                text: parsed.content.into_iter().map(|block| block.text).collect(),
                prompt_tokens: parsed.usage.input_tokens,
                completion_tokens: parsed.usage.output_tokens,
            })
        })
    }
}
