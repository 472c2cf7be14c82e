//! Domain layer for sermonsmith
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns — no
//! I/O, no async, no HTTP. Everything here is total and deterministic.
//!
//! # Core Concepts
//!
//! ## Structured document
//!
//! The normalized, always-complete multi-section output (title,
//! introduction, ordered points, conclusion, references) derived from
//! freeform generated text by [`extract_document`].
//!
//! ## Extraction tier
//!
//! Which heuristic level produced a given document field:
//!
//! - **Strict**: the text followed the requested heading convention
//! - **Positional**: fields were assigned from blank-line-delimited blocks
//! - **Synthesized**: a deterministic sentence referencing the subject
//!
//! ## Error classification
//!
//! Raw provider failures are mapped by [`classify`] into an immutable
//! [`ErrorReport`] with a fixed-priority kind taxonomy.

pub mod core;
pub mod document;
pub mod generation;
pub mod util;

// Re-export commonly used types
pub use self::core::report::{ErrorKind, ErrorReport, classify};
pub use self::core::subject::Subject;
pub use document::entities::{
    DocumentField, ExtractionTier, ExtractionWarning, SermonPoint, StructuredDocument,
};
pub use document::extract::extract_document;
pub use document::references::extract_references;
pub use document::schema::{looks_like_json, parse_document_json};
pub use generation::request::{
    ChatMessage, GenerationRequest, OutputShape, Role, RoutePreference,
};
pub use generation::run::{Run, RunId, RunStatus, ThreadId};
