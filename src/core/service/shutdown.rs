//! Cooperative shutdown signalling.
//!
//! A thin wrapper over a `tokio::sync::watch` channel. The scheduler and
//! runner observe the token at every suspension point; nothing is ever
//! force-killed.

use tokio::sync::watch;

/// Create a linked trigger/token pair.
#[must_use]
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), ShutdownToken(rx))
}

/// Sending half; owned by the process entry point.
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.0.send(true);
    }
}

/// Receiving half; cheap to clone and share.
#[derive(Clone)]
pub struct ShutdownToken(watch::Receiver<bool>);

impl ShutdownToken {
    /// A token that never fires, for one-shot commands and tests.
    #[must_use]
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the channel open for the life of the process.
        std::mem::forget(tx);
        Self(rx)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolve once shutdown is requested. A dropped trigger counts as
    /// shutdown.
    pub async fn cancelled(&self) {
        let mut rx = self.0.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
