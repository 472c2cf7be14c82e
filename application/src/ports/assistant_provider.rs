//! Assistant provider port
//!
//! The primary generation path: an opaque conversational-assistant service
//! exposing exactly five operations (thread creation, message submission,
//! run start, run retrieval, message listing). No particular wire format
//! is assumed beyond these.

use async_trait::async_trait;
use sermonsmith_domain::{ChatMessage, Role, Run, RunId, ThreadId};
use thiserror::Error;

/// Errors raised by provider adapters. Raw — callers never see these;
/// the cascade classifies them into typed reports.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// The HTTP status carried by the failure, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One text-typed piece of an assistant message. Providers may interleave
/// other content kinds (images, tool output); those are opaque here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    Text(String),
    /// Non-text content the pipeline has no use for.
    Unsupported,
}

/// A message as listed from a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: Role,
    /// Provider creation time (unix seconds); recency ordering key.
    pub created_at: i64,
    pub content: Vec<ContentSegment>,
}

impl ThreadMessage {
    /// Concatenate the text-typed segments in original order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.content {
            if let ContentSegment::Text(text) = segment {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }
}

/// Primary generation provider (port).
///
/// Implementations must be safe for concurrent reentrant use: one instance
/// is constructed at startup and shared read-only across requests.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Open a fresh thread for one exchange.
    async fn create_thread(&self) -> Result<ThreadId, ProviderError>;

    /// Append one message to the thread. Content must be non-empty.
    async fn add_message(
        &self,
        thread_id: &ThreadId,
        message: &ChatMessage,
    ) -> Result<(), ProviderError>;

    /// Begin processing. `instructions` narrows behavior for this run only.
    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
        instructions: Option<&str>,
    ) -> Result<Run, ProviderError>;

    /// Observe the current run state.
    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, ProviderError>;

    /// List all messages on the thread.
    async fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_segments_in_order() {
        let message = ThreadMessage {
            role: Role::Assistant,
            created_at: 1,
            content: vec![
                ContentSegment::Text("first".to_string()),
                ContentSegment::Unsupported,
                ContentSegment::Text("second".to_string()),
            ],
        };
        assert_eq!(message.text(), "first\nsecond");
    }

    #[test]
    fn text_of_non_text_message_is_empty() {
        let message = ThreadMessage {
            role: Role::Assistant,
            created_at: 1,
            content: vec![ContentSegment::Unsupported],
        };
        assert_eq!(message.text(), "");
    }

    #[test]
    fn status_accessor() {
        let err = ProviderError::Status {
            status: 404,
            message: "No assistant found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ProviderError::Transport("dns".to_string()).status(), None);
    }
}
