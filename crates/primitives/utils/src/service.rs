//! Cooperative cancellation for long-running operations.
//!
//! A [`ServiceContext`] wraps a [`CancellationToken`]. Operations that poll
//! the network hold one and check it between round trips, so a user interrupt
//! stops them without leaving partial side effects behind.

use std::future::Future;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct ServiceContext {
    token: CancellationToken,
}

impl ServiceContext {
    pub fn new() -> Self {
        Self { token: CancellationToken::new() }
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Runs `f` to completion unless the context is cancelled first, in which
    /// case `f` is dropped and `None` is returned.
    pub async fn run_until_cancelled<F: Future>(&self, f: F) -> Option<F::Output> {
        tokio::select! {
            _ = self.token.cancelled() => None,
            res = f => Some(res),
        }
    }

    /// A child context: cancelled when the parent is, cancellable on its own.
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token() }
    }
}
