//! Subject value object

use serde::{Deserialize, Serialize};

/// The passage or topic anchoring one generation request (Value Object)
///
/// Used as the fallback anchor for extraction: synthesized sections, the
/// fallback title, and the guaranteed first entry of the references list
/// all derive from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    content: String,
}

impl Subject {
    /// Create a new subject
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Subject cannot be empty");
        Self { content }
    }

    /// Try to create a new subject, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the subject content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Subject::new(s)
    }
}

impl From<String> for Subject {
    fn from(s: String) -> Self {
        Subject::new(s)
    }
}
