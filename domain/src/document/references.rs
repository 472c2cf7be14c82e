//! Scripture citation scanning.
//!
//! Scans raw generated text for canonical `Book chapter:verse` citations
//! ("John 3:16", "1 Corinthians 13:4-7", "Song of Solomon 2:1"). The
//! originally requested subject is always the first entry and appears
//! exactly once, no matter how often it recurs verbatim in the body.

use crate::core::subject::Subject;
use regex::Regex;
use std::sync::OnceLock;

static CITATION_RE: OnceLock<Regex> = OnceLock::new();

fn citation_re() -> &'static Regex {
    CITATION_RE.get_or_init(|| {
        Regex::new(
            r"\b(?:[1-3]\s+)?[A-Z][A-Za-z]+(?:\s+of\s+[A-Z][a-z]+)?\s+\d{1,3}:\d{1,3}(?:\s*[-–]\s*\d{1,3})?",
        )
        .expect("citation pattern is valid")
    })
}

fn normalize(citation: &str) -> String {
    citation.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the ordered, deduplicated references list for a document.
///
/// First-seen order is preserved; duplicates (after whitespace
/// normalization) are dropped; the subject is inserted first.
pub fn extract_references(raw_text: &str, subject: &Subject) -> Vec<String> {
    let mut seen = vec![normalize(subject.content())];
    let mut references = vec![subject.content().trim().to_string()];

    for found in citation_re().find_iter(raw_text) {
        let normalized = normalize(found.as_str());
        if !seen.contains(&normalized) {
            seen.push(normalized);
            references.push(found.as_str().trim().to_string());
        }
    }

    references
}
