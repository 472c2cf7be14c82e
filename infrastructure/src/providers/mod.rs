//! Provider adapters.
//!
//! Both adapters speak OpenAI-compatible HTTP and share one injected
//! `reqwest::Client`. The client is constructed once at startup and these
//! adapters never mutate it, so they are safe for concurrent reentrant use.

pub mod assistants_api;
pub mod completions_api;

use sermonsmith_application::ports::assistant_provider::ProviderError;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Extract a human-readable message from a provider error body.
///
/// Provider errors usually arrive as `{"error": {"message": "..."}}`; when
/// they do not, the raw body (or the bare status) is the message.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

/// Convert a non-success HTTP response into a [`ProviderError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Status {
        status,
        message: error_message(status, &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_structured_body() {
        let body = r#"{"error": {"message": "No assistant found with id 'asst_x'"}}"#;
        assert_eq!(
            error_message(404, body),
            "No assistant found with id 'asst_x'"
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(error_message(502, "upstream gone"), "upstream gone");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(error_message(500, "   "), "HTTP 500");
    }
}
