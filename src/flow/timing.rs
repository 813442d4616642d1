//! Transition timing and flow teardown.
//!
//! Debounces go through `TransitionTimer`, which sleeps on tokio time so tests
//! can run with a paused clock and advance it deterministically. Every wait is
//! raced against the owning flow's `FlowLifetime`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Teardown signal shared by a flow instance and its in-flight work.
#[derive(Debug, Clone)]
pub struct FlowLifetime {
    tx: Arc<watch::Sender<bool>>,
}

impl FlowLifetime {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Mark the flow as torn down. Idempotent.
    pub fn end(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ended(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `end` has been called.
    pub async fn ended(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                // Sender lives in `self`, so this only happens on shutdown.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for FlowLifetime {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed debounce held before a step change is applied.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTimer {
    delay: Duration,
}

impl TransitionTimer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the debounce. Returns `false` if the flow was torn down first.
    pub async fn hold(&self, lifetime: &FlowLifetime) -> bool {
        tokio::select! {
            biased;
            _ = lifetime.ended() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn hold_waits_for_full_delay() {
        let timer = TransitionTimer::new(Duration::from_millis(300));
        let lifetime = FlowLifetime::new();
        let started = tokio::time::Instant::now();

        assert!(timer.hold(&lifetime).await);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn hold_aborts_on_teardown() {
        let timer = TransitionTimer::new(Duration::from_secs(60));
        let lifetime = FlowLifetime::new();

        let ender = lifetime.clone();
        let (held, _) = tokio::join!(timer.hold(&lifetime), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ender.end();
        });

        assert!(!held);
        assert!(lifetime.is_ended());
    }

    #[tokio::test]
    async fn ended_resolves_immediately_after_end() {
        let lifetime = FlowLifetime::new();
        lifetime.end();
        lifetime.end();
        lifetime.ended().await;
    }
}
