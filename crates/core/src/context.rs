//! Per-call cancellation and deadline context.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// Cancellation token plus optional deadline, passed to every adapter call.
///
/// Cloning shares the same token. [`Context::child`] derives a context that is
/// cancelled with its parent but can also be cancelled on its own.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A fresh context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// Tightens the deadline to at most `timeout` from now.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Tightens the deadline to `at`. A later deadline than the current one is ignored.
    #[must_use]
    pub fn deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(at, |current| current.min(at)));
        self
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason this context is done, if it already is.
    pub fn err(&self) -> Option<ProviderError> {
        if self.token.is_cancelled() {
            Some(ProviderError::Cancelled)
        } else if self.deadline.is_some_and(|at| Instant::now() >= at) {
            Some(ProviderError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ProviderError {
        match self.deadline {
            Some(at) => tokio::select! {
                biased;
                () = self.token.cancelled() => ProviderError::Cancelled,
                () = tokio::time::sleep_until(at) => ProviderError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ProviderError::Cancelled
            }
        }
    }

    /// Runs `fut` until it finishes or the context is done.
    ///
    /// When the context wins, `fut` is dropped, which aborts any request in flight.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }
}
