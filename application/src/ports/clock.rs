//! Clock port
//!
//! The poll loop waits through this trait instead of sleeping directly, so
//! tests drive the loop without real delays.

use async_trait::async_trait;
use std::time::Duration;

/// Injectable wait primitive.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
