//! Assistants API adapter (primary provider).
//!
//! Implements the five-operation assistant port over an OpenAI-compatible
//! Assistants v2 HTTP surface. Wire structs are private; everything leaves
//! this module as domain/port types.

use super::{DEFAULT_BASE_URL, status_error};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use sermonsmith_application::ports::assistant_provider::{
    AssistantProvider, ContentSegment, ProviderError, ThreadMessage,
};
use sermonsmith_domain::{ChatMessage, Role, Run, RunId, RunStatus, ThreadId};
use tracing::debug;

/// reqwest-backed primary provider.
pub struct AssistantsApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AssistantsApiProvider {
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

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AssistantProvider for AssistantsApiProvider {
    async fn create_thread(&self) -> Result<ThreadId, ProviderError> {
        let thread: ThreadObject = self
            .send(self.request(reqwest::Method::POST, "/threads").json(&json!({})))
            .await?;
        debug!(thread = %thread.id, "thread created");
        Ok(ThreadId::new(thread.id))
    }

    async fn add_message(
        &self,
        thread_id: &ThreadId,
        message: &ChatMessage,
    ) -> Result<(), ProviderError> {
        let _: MessageObject = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/threads/{}/messages", thread_id),
                )
                .json(message),
            )
            .await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
        instructions: Option<&str>,
    ) -> Result<Run, ProviderError> {
        let mut body = json!({ "assistant_id": assistant_id });
        if let Some(instructions) = instructions {
            body["instructions"] = json!(instructions);
        }
        let run: RunObject = self
            .send(
                self.request(reqwest::Method::POST, &format!("/threads/{}/runs", thread_id))
                    .json(&body),
            )
            .await?;
        Ok(run.into())
    }

    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, ProviderError> {
        let run: RunObject = self
            .send(self.request(
                reqwest::Method::GET,
                &format!("/threads/{}/runs/{}", thread_id, run_id),
            ))
            .await?;
        Ok(run.into())
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
    ) -> Result<Vec<ThreadMessage>, ProviderError> {
        let list: MessageList = self
            .send(self.request(
                reqwest::Method::GET,
                &format!("/threads/{}/messages", thread_id),
            ))
            .await?;
        Ok(list.data.into_iter().map(ThreadMessage::from).collect())
    }
}

// -- Wire types ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
}

impl From<RunObject> for Run {
    fn from(run: RunObject) -> Self {
        Run::new(RunId::new(run.id), RunStatus::from_wire(&run.status))
    }
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    content: Vec<ContentObject>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentObject {
    Text { text: TextObject },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextObject {
    value: String,
}

impl From<MessageObject> for ThreadMessage {
    fn from(message: MessageObject) -> Self {
        let role = match message.role.as_str() {
            "assistant" => Role::Assistant,
            "system" => Role::System,
            _ => Role::User,
        };
        let content = message
            .content
            .into_iter()
            .map(|segment| match segment {
                ContentObject::Text { text } => ContentSegment::Text(text.value),
                ContentObject::Other => ContentSegment::Unsupported,
            })
            .collect();
        ThreadMessage {
            role,
            created_at: message.created_at,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_object_maps_wire_status() {
        let run: RunObject =
            serde_json::from_str(r#"{"id": "run_1", "status": "in_progress"}"#).unwrap();
        let run: Run = run.into();
        assert_eq!(run.id, RunId::new("run_1"));
        assert_eq!(run.status, RunStatus::InProgress);
    }

    #[test]
    fn message_object_keeps_text_segments_in_order() {
        let raw = r#"{
            "role": "assistant",
            "created_at": 1700000000,
            "content": [
                {"type": "text", "text": {"value": "first"}},
                {"type": "image_file", "image_file": {"file_id": "file_1"}},
                {"type": "text", "text": {"value": "second"}}
            ]
        }"#;
        let message: MessageObject = serde_json::from_str(raw).unwrap();
        let message: ThreadMessage = message.into();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.created_at, 1_700_000_000);
        assert_eq!(message.text(), "first\nsecond");
    }

    #[test]
    fn unknown_roles_default_to_user() {
        let raw = r#"{"role": "tool", "created_at": 1, "content": []}"#;
        let message: MessageObject = serde_json::from_str(raw).unwrap();
        let message: ThreadMessage = message.into();
        assert_eq!(message.role, Role::User);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let provider = AssistantsApiProvider::with_base_url(
            reqwest::Client::new(),
            "sk-test",
            "https://example.test/v1/",
        );
        assert_eq!(provider.base_url, "https://example.test/v1");
    }
}
