//! OpenAI-compatible provider - Implementation of AIProvider over the
//! `/chat/completions` endpoint.
//!
//! Works against any backend that speaks the OpenAI chat completions
//! protocol; the base URL and model name come from configuration.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("qwen3-235b:strip_thinking_response=true")
//!     .with_base_url("https://api.example.com/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events. Bytes are run through [`SseLineBuffer`] so
//! payloads split across network chunks are reassembled, then each JSON
//! payload is parsed into a `StreamChunk`. Exactly one final chunk is
//! emitted, carrying the finish reason and usage when the backend reports
//! them.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;

use crate::adapters::sse::{SseEvent, SseLineBuffer};
use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model identifier passed through to the backend.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "qwen3-235b:strip_thinking_response=true".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible API provider.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to the wire format.
    fn to_openai_request(&self, request: &CompletionRequest, stream: bool) -> OpenAIRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect();

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.params.max_tokens,
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<Response, AIError> {
        let body = self.to_openai_request(request, stream);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })?;

        Self::handle_response_status(response).await
    }

    /// Parses the API response status and maps failures.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from an error body, defaulting to 30 seconds.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let idx = message.find("try again in ")?;
                let rest = &message[idx + "try again in ".len()..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .unwrap_or(30)
    }

    async fn parse_response(response: Response) -> Result<CompletionResponse, AIError> {
        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or(AIError::EmptyResponse)?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AIError::EmptyResponse);
        }

        Ok(CompletionResponse {
            content,
            usage: openai_response
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
                .unwrap_or_default(),
            model: openai_response.model,
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        })
    }

    /// Runs `attempt` with exponential backoff (1s, 2s, 4s, ...) on retryable errors.
    async fn with_retries<T, F, Fut>(&self, mut attempt: F) -> Result<T, AIError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, AIError>>,
    {
        let mut retry_count = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    tracing::warn!(
                        error = %err,
                        attempt = retry_count + 1,
                        "Completion request failed, retrying"
                    );
                    sleep(Duration::from_secs(1 << retry_count)).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let request = &request;
        self.with_retries(move || async move {
            let response = self.send(request, false).await?;
            Self::parse_response(response).await
        })
        .await
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        // Only opening the stream is retried; once bytes flow, a failure is final.
        let request = &request;
        let response = self.with_retries(move || self.send(request, true)).await?;
        Ok(chunk_stream(response.bytes_stream()))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model).with_streaming(true)
    }
}

/// Parser state carried between network chunks.
struct StreamState<S> {
    bytes: Pin<Box<S>>,
    lines: SseLineBuffer,
    pending: VecDeque<Result<StreamChunk, AIError>>,
    finish_reason: Option<FinishReason>,
    usage: Option<TokenUsage>,
    done: bool,
}

impl<S> StreamState<S> {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match event {
                SseEvent::Done => {
                    self.done = true;
                    break;
                }
                SseEvent::Malformed(reason) => {
                    self.pending.push_back(Err(AIError::parse(reason)));
                    self.done = true;
                    break;
                }
                SseEvent::Data(data) => match serde_json::from_str::<StreamResponseChunk>(&data) {
                    Ok(chunk) => {
                        if let Some(u) = chunk.usage {
                            self.usage = Some(TokenUsage::new(u.prompt_tokens, u.completion_tokens));
                        }
                        if let Some(choice) = chunk.choices.into_iter().next() {
                            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                                self.pending.push_back(Ok(StreamChunk::content(content)));
                            }
                            if let Some(reason) = choice.finish_reason {
                                self.finish_reason = Some(FinishReason::from_wire(Some(&reason)));
                            }
                        }
                    }
                    Err(e) => {
                        self.pending.push_back(Err(AIError::parse(format!(
                            "Failed to parse SSE chunk: {}",
                            e
                        ))));
                        self.done = true;
                        break;
                    }
                },
            }
        }

        if self.done {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.done = true;
        let reason = self.finish_reason.take().unwrap_or(FinishReason::Stop);
        if !matches!(self.pending.back(), Some(Err(_))) {
            self.pending
                .push_back(Ok(StreamChunk::final_chunk(reason, self.usage.take())));
        }
    }
}

/// Turns a raw SSE byte stream into completion chunks.
fn chunk_stream<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = StreamState {
        bytes: Box::pin(bytes),
        lines: SseLineBuffer::new(),
        pending: VecDeque::new(),
        finish_reason: None,
        usage: None,
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.lines.feed(chunk.as_ref());
                    state.absorb(events);
                }
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(AIError::network(format!("Stream error: {}", e))));
                    state.done = true;
                }
                None => {
                    let events = state.lines.flush();
                    state.absorb(events);
                    if !state.done {
                        state.finish();
                    }
                }
            }
        }
    }))
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ContextMessage;
    use crate::domain::foundation::{FriendId, UserId};
    use crate::ports::{GenerationParams, RequestMetadata};

    type ByteItems = stream::Iter<std::vec::IntoIter<Result<Vec<u8>, std::io::Error>>>;

    fn bytes_of(chunks: &[&str]) -> ByteItems {
        let owned: Vec<Result<Vec<u8>, std::io::Error>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    async fn collect(chunks: &[&str]) -> Vec<Result<StreamChunk, AIError>> {
        chunk_stream(bytes_of(chunks)).collect().await
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5);

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn request_carries_sampling_params_and_roles() {
        let provider = OpenAIProvider::new(OpenAIConfig::new("k").with_model("m")).unwrap();
        let request = CompletionRequest::new(RequestMetadata::new(
            UserId::new("u").unwrap(),
            FriendId::new(),
            "t",
        ))
        .with_message(ContextMessage::system("persona"))
        .with_message(ContextMessage::user("hi"))
        .with_params(GenerationParams {
            temperature: 0.6,
            max_tokens: 1000,
            top_p: 0.95,
        });

        let body = serde_json::to_value(provider.to_openai_request(&request, true)).unwrap();
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
        assert!((body["top_p"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let provider =
            OpenAIProvider::new(OpenAIConfig::new("k").with_base_url("https://x.test/v1/")).unwrap();
        assert_eq!(provider.completions_url(), "https://x.test/v1/chat/completions");
    }

    #[tokio::test]
    async fn stream_keeps_characters_split_across_chunks() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"café ☕\"}}]}\n\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let owned: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(line[..split].to_vec()), Ok(line[split..].to_vec())];

        let chunks: Vec<StreamChunk> = chunk_stream(stream::iter(owned))
            .map(|c| c.unwrap())
            .collect()
            .await;

        let text: String = chunks.iter().map(|c| c.delta.as_str()).collect();
        assert_eq!(text, "café ☕");
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_parse_error() {
        let owned: Vec<Result<Vec<u8>, std::io::Error>> = vec![Ok(b"data: \xff\n\n".to_vec())];

        let chunks: Vec<Result<StreamChunk, AIError>> =
            chunk_stream(stream::iter(owned)).collect().await;

        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0], Err(AIError::Parse(_))));
    }

    #[tokio::test]
    async fn stream_yields_deltas_then_one_final_chunk() {
        let chunks = collect(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
            "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":2}}\n\n",
            "data: [DONE]\n\n",
        ])
        .await;

        let chunks: Vec<StreamChunk> = chunks.into_iter().map(|c| c.unwrap()).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].delta, "Hel");
        assert_eq!(chunks[1].delta, "lo");
        assert!(chunks[2].is_final());
        assert_eq!(chunks[2].finish_reason, Some(FinishReason::Stop));
        assert_eq!(chunks[2].usage, Some(TokenUsage::new(10, 2)));
    }

    #[tokio::test]
    async fn stream_reassembles_payload_split_across_chunks() {
        let chunks = collect(&[
            "data: {\"choices\":[{\"delta\":{\"con",
            "tent\":\"whole\"}}]}\n\ndata: [DONE]\n\n",
        ])
        .await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().delta, "whole");
        assert!(chunks[1].as_ref().unwrap().is_final());
    }

    #[tokio::test]
    async fn stream_without_done_marker_still_finishes() {
        let chunks = collect(&["data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n"]).await;

        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].as_ref().unwrap().is_final());
    }

    #[tokio::test]
    async fn malformed_payload_ends_stream_with_parse_error() {
        let chunks = collect(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
            "data: {not json}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"never\"}}]}\n\n",
        ])
        .await;

        assert_eq!(chunks.len(), 2);
        assert!(matches!(chunks[1], Err(AIError::Parse(_))));
    }

    #[tokio::test]
    async fn transport_error_mid_stream_is_network_error() {
        let items: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let chunks: Vec<_> = chunk_stream(stream::iter(items)).collect().await;

        assert_eq!(chunks.len(), 2);
        assert!(matches!(chunks[1], Err(AIError::Network(_))));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 12 seconds."}}"#;
        assert_eq!(OpenAIProvider::parse_retry_after(error), 12);
    }

    #[test]
    fn parse_retry_after_default() {
        let error = r#"{"error":{"message":"Something went wrong"}}"#;
        assert_eq!(OpenAIProvider::parse_retry_after(error), 30);
    }
}
