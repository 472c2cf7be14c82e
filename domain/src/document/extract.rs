//! Resilient structured extraction.
//!
//! Converts a raw generated answer into a complete [`StructuredDocument`]
//! using layered, never-failing strategies. Each field (title,
//! introduction, points, conclusion) is resolved independently; the first
//! tier that yields it wins, and the winning tier is recorded per field:
//!
//! 1. **Strict** — the text followed the heading convention (markdown
//!    headings, bold lines, numbered lines) with recognizable keywords.
//! 2. **Positional** — blank-line-delimited blocks assigned by position:
//!    first adequate block as introduction, interior blocks as points, last
//!    adequate block as conclusion.
//! 3. **Synthesized** — a deterministic sentence referencing the subject.
//!
//! Total over all string inputs, including the empty string: extraction
//! never fails and the resulting document is never partially populated.

use crate::core::subject::Subject;
use crate::document::entities::{
    DocumentField, ExtractionTier, ExtractionWarning, SermonPoint, StructuredDocument,
};
use crate::document::references::extract_references;
use crate::util::preview;
use regex::Regex;
use std::sync::OnceLock;

/// Minimum trimmed length for a section or block to count as real content.
const MIN_SECTION_LEN: usize = 10;
/// Byte budget for titles derived from running text.
const MAX_TITLE_LEN: usize = 60;

const INTRO_KEYWORDS: &[&str] = &["introduction", "intro", "opening"];
const CONCLUSION_KEYWORDS: &[&str] = &[
    "conclusion",
    "in closing",
    "closing",
    "final thoughts",
    "summary",
];

static MARKDOWN_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static BOLD_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static NUMBERED_RE: OnceLock<Regex> = OnceLock::new();

fn markdown_heading_re() -> &'static Regex {
    MARKDOWN_HEADING_RE.get_or_init(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("valid pattern"))
}

fn bold_heading_re() -> &'static Regex {
    BOLD_HEADING_RE.get_or_init(|| Regex::new(r"^\*\*(.+?)\*\*:?\s*$").expect("valid pattern"))
}

fn numbered_re() -> &'static Regex {
    NUMBERED_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:point\s+)?(\d{1,2}|[ivx]{1,4})\s*[.):]\s*(.*)$")
            .expect("valid pattern")
    })
}

/// One heading-delimited segment of the raw text.
struct Section {
    heading: Option<String>,
    body: String,
}

impl Section {
    fn content(&self) -> &str {
        self.body.trim()
    }

    fn is_adequate(&self) -> bool {
        self.content().len() >= MIN_SECTION_LEN
    }
}

/// What a heading announces.
enum SectionKind {
    Introduction,
    Point(String),
    Conclusion,
    /// A heading with no recognized keyword — typically the document title.
    Other,
}

/// Extract the heading text of a line, if the line is a heading marker.
///
/// Numbered lines only count as headings when short, so running prose that
/// happens to start with "1." is not swallowed whole.
fn heading_text(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if let Some(captures) = markdown_heading_re().captures(trimmed) {
        return Some(captures[1].trim().to_string());
    }
    if let Some(captures) = bold_heading_re().captures(trimmed) {
        return Some(captures[1].trim().to_string());
    }
    if trimmed.len() <= 80 && numbered_re().is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    None
}

fn starts_with_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.starts_with(k))
}

fn classify_heading(text: &str) -> SectionKind {
    // Strip numbering first so "1. Introduction" still reads as an intro.
    if let Some(captures) = numbered_re().captures(text) {
        let remainder = captures[2].trim().to_string();
        let lowered = remainder.to_lowercase();
        if starts_with_any(&lowered, INTRO_KEYWORDS) {
            return SectionKind::Introduction;
        }
        if starts_with_any(&lowered, CONCLUSION_KEYWORDS) {
            return SectionKind::Conclusion;
        }
        return SectionKind::Point(remainder);
    }

    let lowered = text.to_lowercase();
    if starts_with_any(&lowered, INTRO_KEYWORDS) {
        return SectionKind::Introduction;
    }
    if starts_with_any(&lowered, CONCLUSION_KEYWORDS) {
        return SectionKind::Conclusion;
    }
    SectionKind::Other
}

/// Split raw text into heading-delimited sections. Text before the first
/// heading becomes a heading-less leading section.
fn split_sections(raw: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut body = String::new();

    for line in raw.lines() {
        if let Some(text) = heading_text(line) {
            if heading.is_some() || !body.trim().is_empty() {
                sections.push(Section {
                    heading: heading.take(),
                    body: std::mem::take(&mut body),
                });
            }
            heading = Some(text);
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    if heading.is_some() || !body.trim().is_empty() {
        sections.push(Section { heading, body });
    }
    sections
}

/// Blank-line-delimited blocks with heading lines stripped out, in order.
fn positional_blocks(raw: &str) -> Vec<String> {
    raw.split("\n\n")
        .map(|block| {
            block
                .lines()
                .filter(|line| heading_text(line).is_none())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|block| !block.is_empty())
        .collect()
}

/// A field value with the tier that produced it.
struct Extracted<T> {
    value: T,
    tier: ExtractionTier,
}

impl<T> Extracted<T> {
    fn new(value: T, tier: ExtractionTier) -> Self {
        Self { value, tier }
    }
}

/// Convert a raw text answer into a complete structured document.
///
/// `caller_title`, when present, wins over anything extracted. `subject` is
/// the passage/topic that motivated generation; it anchors synthesized
/// sections and is always the first reference.
pub fn extract_document(
    raw_text: &str,
    subject: &Subject,
    caller_title: Option<&str>,
) -> StructuredDocument {
    let sections = split_sections(raw_text);

    // -- Tier 1: strict headings ------------------------------------------
    let mut introduction: Option<Extracted<String>> = None;
    let mut conclusion: Option<Extracted<String>> = None;
    let mut points: Vec<SermonPoint> = Vec::new();
    let mut heading_title: Option<String> = None;
    let mut first_point_title: Option<String> = None;
    let mut first_heading: Option<String> = None;

    for section in &sections {
        let Some(heading) = &section.heading else {
            continue;
        };
        if first_heading.is_none() {
            first_heading = Some(heading.clone());
        }
        match classify_heading(heading) {
            SectionKind::Introduction => {
                if introduction.is_none() && section.is_adequate() {
                    introduction = Some(Extracted::new(
                        section.content().to_string(),
                        ExtractionTier::Strict,
                    ));
                }
            }
            SectionKind::Conclusion => {
                if conclusion.is_none() && section.is_adequate() {
                    conclusion = Some(Extracted::new(
                        section.content().to_string(),
                        ExtractionTier::Strict,
                    ));
                }
            }
            SectionKind::Point(title) => {
                if section.is_adequate() {
                    let title = if title.is_empty() {
                        format!("Point {}", points.len() + 1)
                    } else {
                        title
                    };
                    if first_point_title.is_none() {
                        first_point_title = Some(title.clone());
                    }
                    points.push(SermonPoint::new(title, section.content()));
                }
            }
            SectionKind::Other => {
                if heading_title.is_none() {
                    heading_title = Some(heading.clone());
                }
            }
        }
    }

    let mut points = if points.is_empty() {
        None
    } else {
        Some(Extracted::new(points, ExtractionTier::Strict))
    };

    // -- Tier 2: positional blocks ----------------------------------------
    let blocks = positional_blocks(raw_text);
    let adequate = |block: &String| block.len() >= MIN_SECTION_LEN;
    let first_adequate = blocks.iter().position(adequate);
    let last_adequate = blocks.iter().rposition(adequate);

    if introduction.is_none()
        && let Some(first) = first_adequate
    {
        introduction = Some(Extracted::new(
            blocks[first].clone(),
            ExtractionTier::Positional,
        ));
    }

    if conclusion.is_none()
        && let (Some(first), Some(last)) = (first_adequate, last_adequate)
        && last != first
    {
        conclusion = Some(Extracted::new(
            blocks[last].clone(),
            ExtractionTier::Positional,
        ));
    }

    if points.is_none()
        && let (Some(first), Some(last)) = (first_adequate, last_adequate)
        && last > first + 1
    {
        let interior: Vec<SermonPoint> = blocks[first + 1..last]
            .iter()
            .filter(|block| adequate(block))
            .map(|block| {
                let leading = block.lines().next().unwrap_or_default();
                SermonPoint::new(preview(leading, MAX_TITLE_LEN), block.clone())
            })
            .collect();
        if !interior.is_empty() {
            points = Some(Extracted::new(interior, ExtractionTier::Positional));
        }
    }

    let positional_title = first_adequate.map(|first| {
        let leading = blocks[first].lines().next().unwrap_or_default();
        preview(leading, MAX_TITLE_LEN)
    });

    // -- Tier 3: synthesis -------------------------------------------------
    let introduction = introduction.unwrap_or_else(|| {
        Extracted::new(
            format!(
                "Today we turn our attention to {subject} and listen for what \
                 it speaks into our lives."
            ),
            ExtractionTier::Synthesized,
        )
    });
    let conclusion = conclusion.unwrap_or_else(|| {
        Extracted::new(
            format!("May the message of {subject} remain with us as we go."),
            ExtractionTier::Synthesized,
        )
    });
    let points = points.unwrap_or_else(|| {
        Extracted::new(
            vec![SermonPoint::new(
                "Reflection",
                format!("Take time this week to meditate on {subject} and carry it into prayer."),
            )],
            ExtractionTier::Synthesized,
        )
    });

    // Title preference: caller-supplied, then a non-keyword heading, then
    // the first point's title, then the first heading line, then the
    // leading line of the first adequate block, then synthesis.
    let title = if let Some(title) = caller_title.map(str::trim).filter(|t| !t.is_empty()) {
        Extracted::new(title.to_string(), ExtractionTier::Strict)
    } else if let Some(title) = heading_title
        .or(first_point_title)
        .or(first_heading)
    {
        Extracted::new(title, ExtractionTier::Strict)
    } else if let Some(title) = positional_title {
        Extracted::new(title, ExtractionTier::Positional)
    } else {
        Extracted::new(format!("Sermon on {subject}"), ExtractionTier::Synthesized)
    };

    // Every point carries a non-empty title and content; placeholders are
    // per-point, never whole-document.
    let normalized_points: Vec<SermonPoint> = points
        .value
        .into_iter()
        .enumerate()
        .map(|(index, point)| {
            let title = if point.title.trim().is_empty() {
                format!("Point {}", index + 1)
            } else {
                point.title.trim().to_string()
            };
            let content = if point.content.trim().is_empty() {
                format!("Consider what {subject} teaches about {title}.")
            } else {
                point.content.trim().to_string()
            };
            SermonPoint::new(title, content)
        })
        .collect();

    let extraction_warnings = vec![
        ExtractionWarning {
            field: DocumentField::Title,
            tier: title.tier,
        },
        ExtractionWarning {
            field: DocumentField::Introduction,
            tier: introduction.tier,
        },
        ExtractionWarning {
            field: DocumentField::Points,
            tier: points.tier,
        },
        ExtractionWarning {
            field: DocumentField::Conclusion,
            tier: conclusion.tier,
        },
    ];

    StructuredDocument {
        title: title.value,
        introduction: introduction.value,
        points: normalized_points,
        conclusion: conclusion.value,
        references: extract_references(raw_text, subject),
        raw_text: raw_text.to_string(),
        extraction_warnings,
    }
}
