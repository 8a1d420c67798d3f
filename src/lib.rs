//! Friend Chat - streaming conversations with persistent AI friend personas.
//!
//! A user sends a message to one of their friends; the reply is streamed
//! back token by token and the exchange is stored atomically once it is
//! complete. Daily quotas, rollback of the latest exchange, and an
//! optimistic client-side state machine sit around that pipeline.

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
