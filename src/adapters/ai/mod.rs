//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! - `OpenAIProvider` - any OpenAI-compatible chat completions backend
//! - `MockAIProvider` - configurable mock for testing

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
