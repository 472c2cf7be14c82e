//! Completion provider port
//!
//! The secondary generation path: one stateless call in, one text answer
//! out. Used when the primary route is forced off, defaulted off, or has
//! failed with a missing-assistant error.

use super::assistant_provider::ProviderError;
use async_trait::async_trait;
use sermonsmith_domain::ChatMessage;

/// Sampling parameters for a single-shot completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

impl CompletionParams {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Secondary generation provider (port). Shared read-only across requests.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete the conversation in a single exchange, returning the text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError>;
}
