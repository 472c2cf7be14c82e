//! Application layer for sermonsmith
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer; the provider
//! adapters implementing the ports live in the infrastructure layer and
//! are injected by the binary.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_ASSISTANT_ID, Environment, GenerationConfig, PollSettings, Route};
pub use ports::{
    assistant_provider::{AssistantProvider, ContentSegment, ProviderError, ThreadMessage},
    clock::Clock,
    completion_provider::{CompletionParams, CompletionProvider},
};
pub use use_cases::generate::{
    GenerateError, GenerationOutcome, GenerationOutput, GenerateUseCase,
};
pub use use_cases::run_thread::{RunThreadError, RunThreadInput, RunThreadUseCase};
