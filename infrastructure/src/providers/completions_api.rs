//! Chat Completions adapter (secondary provider).
//!
//! One stateless call: the whole conversation goes out, one text answer
//! comes back. This is the simpler path the cascade falls back to.

use super::{DEFAULT_BASE_URL, status_error};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use sermonsmith_application::ports::assistant_provider::ProviderError;
use sermonsmith_application::ports::completion_provider::{CompletionParams, CompletionProvider};
use sermonsmith_domain::ChatMessage;
use tracing::debug;

/// reqwest-backed secondary provider.
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ChatCompletionsProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError> {
        let mut body = json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
        });
        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let completion: CompletionObject = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("completion has no choices".to_string()))?;
        debug!(model = %params.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

// -- Wire types ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CompletionObject {
    choices: Vec<ChoiceObject>,
}

#[derive(Debug, Deserialize)]
struct ChoiceObject {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sermonsmith_domain::Role;

    #[test]
    fn completion_object_parses_first_choice() {
        let raw = r#"{
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "an answer"}}
            ]
        }"#;
        let completion: CompletionObject = serde_json::from_str(raw).unwrap();
        assert_eq!(completion.choices[0].message.content, "an answer");
    }

    #[test]
    fn chat_messages_serialize_to_wire_shape() {
        let message = ChatMessage {
            role: Role::System,
            content: "stay on topic".to_string(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "stay on topic"}));
    }
}
