//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement them.
//!
//! - `AIProvider` - completion backend (streaming and one-shot)
//! - `FriendRepository`, `MessageRepository`, `UserRepository` - row storage
//! - `UnitOfWork` - atomic multi-row writes
//! - `SessionValidator` - bearer token validation

mod ai_provider;
mod repository;
mod session_validator;
mod unit_of_work;

pub use ai_provider::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    GenerationParams, ProviderInfo, RequestMetadata, StreamChunk, TokenUsage,
};
pub use repository::{
    FriendRepository, FriendSummary, MessageRepository, RepositoryError, UserRepository,
};
pub use session_validator::SessionValidator;
pub use unit_of_work::{StoreOperation, UnitOfWork};
