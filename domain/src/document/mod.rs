//! Structured document entities and extraction.

pub mod entities;
pub mod extract;
pub mod references;
pub mod schema;
