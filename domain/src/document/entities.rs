//! Structured document entities.

use serde::{Deserialize, Serialize};

/// Which heuristic level produced a given document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionTier {
    /// The text followed the requested heading convention.
    Strict,
    /// Assigned from blank-line-delimited blocks by position.
    Positional,
    /// Deterministic sentence referencing the subject.
    Synthesized,
}

/// Document fields that extraction resolves independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentField {
    Title,
    Introduction,
    Points,
    Conclusion,
}

/// Records which tier won for one field, for diagnosability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub field: DocumentField,
    pub tier: ExtractionTier,
}

/// One ordered point of the document body. Always carries both a non-empty
/// title and non-empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SermonPoint {
    pub title: String,
    pub content: String,
}

impl SermonPoint {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// The normalized, always-complete multi-section output derived from
/// freeform generated text.
///
/// Invariant: every field is non-empty after extraction — the document is
/// never partially populated. `extraction_warnings` records the winning
/// tier per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub title: String,
    pub introduction: String,
    pub points: Vec<SermonPoint>,
    pub conclusion: String,
    /// Deduplicated, first-seen order; the subject is always first.
    pub references: Vec<String>,
    pub raw_text: String,
    pub extraction_warnings: Vec<ExtractionWarning>,
}

impl StructuredDocument {
    /// The tier recorded for `field`, if extraction recorded one.
    pub fn tier_of(&self, field: DocumentField) -> Option<ExtractionTier> {
        self.extraction_warnings
            .iter()
            .find(|w| w.field == field)
            .map(|w| w.tier)
    }

    /// True when every recorded field tier is [`ExtractionTier::Strict`].
    pub fn is_fully_strict(&self) -> bool {
        self.extraction_warnings
            .iter()
            .all(|w| w.tier == ExtractionTier::Strict)
    }
}
