//! Tokio-backed clock adapter.

use async_trait::async_trait;
use sermonsmith_application::ports::clock::Clock;
use std::time::Duration;

/// Production clock: a real `tokio::time::sleep`.
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
