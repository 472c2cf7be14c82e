//! Strict schema validation for JSON-shaped answers.
//!
//! Some models answer a structured prompt with JSON instead of headed prose.
//! The legacy behavior was to "repair" malformed JSON with regex
//! substitutions, which could silently corrupt content containing quotes.
//! That heuristic is gone: the answer either deserializes strictly into the
//! document schema or it does not, and the caller decides what to do next
//! (one corrective re-prompt, then the heuristic extractor).

use crate::core::subject::Subject;
use crate::document::entities::{
    DocumentField, ExtractionTier, ExtractionWarning, SermonPoint, StructuredDocument,
};
use crate::document::references::extract_references;
use serde::Deserialize;

/// Expected JSON shape of a structured answer.
#[derive(Debug, Deserialize)]
struct DocumentPayload {
    title: String,
    introduction: String,
    points: Vec<PointPayload>,
    conclusion: String,
}

#[derive(Debug, Deserialize)]
struct PointPayload {
    title: String,
    content: String,
}

/// Quick shape check: does this answer even look like a JSON object?
/// Gates whether the corrective re-prompt is worth attempting.
pub fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Strictly parse a JSON answer into a complete document.
///
/// Returns `None` unless the payload deserializes and every section is
/// non-empty — partial documents are rejected rather than patched, so the
/// heuristic extractor stays the single completion path. Successful parses
/// record every field at the strict tier. References are still scanned from
/// the raw text so body citations are not lost.
pub fn parse_document_json(raw_text: &str, subject: &Subject) -> Option<StructuredDocument> {
    let payload: DocumentPayload = serde_json::from_str(raw_text.trim()).ok()?;

    if payload.title.trim().is_empty()
        || payload.introduction.trim().is_empty()
        || payload.conclusion.trim().is_empty()
        || payload.points.is_empty()
    {
        return None;
    }
    if payload
        .points
        .iter()
        .any(|p| p.title.trim().is_empty() || p.content.trim().is_empty())
    {
        return None;
    }

    let points = payload
        .points
        .into_iter()
        .map(|p| SermonPoint::new(p.title.trim(), p.content.trim()))
        .collect();

    let warnings = [
        DocumentField::Title,
        DocumentField::Introduction,
        DocumentField::Points,
        DocumentField::Conclusion,
    ]
    .into_iter()
    .map(|field| ExtractionWarning {
        field,
        tier: ExtractionTier::Strict,
    })
    .collect();

    Some(StructuredDocument {
        title: payload.title.trim().to_string(),
        introduction: payload.introduction.trim().to_string(),
        points,
        conclusion: payload.conclusion.trim().to_string(),
        references: extract_references(raw_text, subject),
        raw_text: raw_text.to_string(),
        extraction_warnings: warnings,
    })
}
