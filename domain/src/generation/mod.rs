//! Generation request and run entities.

pub mod request;
pub mod run;
