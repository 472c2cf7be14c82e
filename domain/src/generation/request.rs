//! Generation request entities.

use crate::core::subject::Subject;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Route hints carried by a request. Force flags are mutually exclusive by
/// convention; when both are set, Primary wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePreference {
    pub force_primary: bool,
    pub force_secondary: bool,
}

impl RoutePreference {
    pub fn primary() -> Self {
        Self {
            force_primary: true,
            force_secondary: false,
        }
    }

    pub fn secondary() -> Self {
        Self {
            force_primary: false,
            force_secondary: true,
        }
    }

    /// Whether either force flag is set.
    pub fn is_forced(&self) -> bool {
        self.force_primary || self.force_secondary
    }
}

/// Requested output shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// Verbatim text back to the caller (conversational chat).
    #[default]
    Freeform,
    /// A complete structured document (sermon generation).
    Structured,
}

/// One generation request: the ordered conversation content plus routing and
/// shaping hints. Request-local — nothing here outlives the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Ordered role-tagged conversation content.
    pub messages: Vec<ChatMessage>,
    pub route: RoutePreference,
    /// Optional per-call system framing. Narrows assistant behavior for this
    /// exchange only; never mutates the assistant's persistent configuration.
    pub instructions: Option<String>,
    pub shape: OutputShape,
    /// The passage/topic that motivated generation; extraction anchor.
    pub subject: Option<Subject>,
    /// Caller-supplied title, preferred over any extracted one.
    pub title: Option<String>,
}

impl GenerationRequest {
    /// Conversational chat: verbatim text out.
    pub fn chat(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            route: RoutePreference::default(),
            instructions: None,
            shape: OutputShape::Freeform,
            subject: None,
            title: None,
        }
    }

    /// Chat restricted to a topic domain via per-call framing.
    pub fn scoped_chat(messages: Vec<ChatMessage>, domain: &str) -> Self {
        let mut request = Self::chat(messages);
        request.instructions = Some(format!(
            "Only answer questions related to {domain}. If the question falls \
             outside that domain, say so briefly and decline."
        ));
        request
    }

    /// Sermon generation: structured document out, anchored on `subject`.
    pub fn sermon(subject: Subject, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            route: RoutePreference::default(),
            instructions: None,
            shape: OutputShape::Structured,
            subject: Some(subject),
            title: None,
        }
    }

    pub fn with_route(mut self, route: RoutePreference) -> Self {
        self.route = route;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_defaults_to_freeform_unforced() {
        let request = GenerationRequest::chat(vec![ChatMessage::user("hello")]);
        assert_eq!(request.shape, OutputShape::Freeform);
        assert!(!request.route.is_forced());
        assert!(request.subject.is_none());
    }

    #[test]
    fn sermon_is_structured_with_subject() {
        let request = GenerationRequest::sermon(
            Subject::new("John 3:16"),
            "Write a sermon on John 3:16",
        );
        assert_eq!(request.shape, OutputShape::Structured);
        assert_eq!(request.subject.unwrap().content(), "John 3:16");
    }

    #[test]
    fn scoped_chat_carries_domain_framing() {
        let request =
            GenerationRequest::scoped_chat(vec![ChatMessage::user("why is the sky blue?")], "biblical studies");
        let instructions = request.instructions.unwrap();
        assert!(instructions.contains("biblical studies"));
    }
}
