//! Core value objects and error classification.

pub mod report;
pub mod subject;
