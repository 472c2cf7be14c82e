//! Application use cases.

pub mod generate;
pub mod run_thread;
