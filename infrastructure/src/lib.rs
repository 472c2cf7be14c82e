//! Infrastructure layer for sermonsmith
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: reqwest-based HTTP adapters for the two generation
//! providers, the tokio clock, and configuration file loading.

pub mod clock;
pub mod config;
pub mod providers;

// Re-export commonly used types
pub use clock::TokioClock;
pub use config::{ConfigError, ConfigLoader, FileConfig, FileGenerationConfig, FileProviderConfig};
pub use providers::{
    assistants_api::AssistantsApiProvider, completions_api::ChatCompletionsProvider,
};
