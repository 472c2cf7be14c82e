//! Port definitions (interfaces to the outside world).
//!
//! Adapters implementing these live in the infrastructure layer and are
//! constructor-injected, so tests substitute fakes freely.

pub mod assistant_provider;
pub mod clock;
pub mod completion_provider;
