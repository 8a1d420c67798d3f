//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling a real completion backend.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Word-by-word streaming with an optional per-chunk delay
//! - Error injection before the stream opens or part way through it
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("Hey! Good to hear from you.")
//!     .with_delay(Duration::from_millis(5));
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(response.content, "Hey! Good to hear from you.");
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Delay before each request resolves and between streamed chunks.
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return the content, streamed one word per chunk.
    Success { content: String, usage: TokenUsage },
    /// Fail before any content is produced.
    Error(AIError),
    /// Stream `partial` and then fail with `error`.
    FailMidStream { partial: String, error: AIError },
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1").with_streaming(true),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: AIError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a response that streams `partial` and then breaks.
    pub fn with_mid_stream_error(self, partial: impl Into<String>, error: AIError) -> Self {
        self.push(MockResponse::FailMidStream {
            partial: partial.into(),
            error,
        })
    }

    /// Sets simulated latency per request and per streamed chunk.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the most recent call, if any.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn record(&self, request: CompletionRequest) {
        self.calls.lock().unwrap().push(request);
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                usage: TokenUsage::new(5, 10),
            })
    }

    fn word_chunks(content: &str) -> Vec<Result<StreamChunk, AIError>> {
        // Keep the whitespace attached so the chunks concatenate back to the original.
        content
            .split_inclusive(char::is_whitespace)
            .map(|word| Ok(StreamChunk::content(word)))
            .collect()
    }

    fn paced(&self, items: Vec<Result<StreamChunk, AIError>>) -> ChunkStream {
        let delay = self.delay;
        Box::pin(stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            item
        }))
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        self.record(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success { content, usage } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) | MockResponse::FailMidStream { error: err, .. } => Err(err),
        }
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        self.record(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success { content, usage } => {
                let mut items = Self::word_chunks(&content);
                items.push(Ok(StreamChunk::final_chunk(FinishReason::Stop, Some(usage))));
                Ok(self.paced(items))
            }
            MockResponse::FailMidStream { partial, error } => {
                let mut items = Self::word_chunks(&partial);
                items.push(Err(error));
                Ok(self.paced(items))
            }
            MockResponse::Error(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
