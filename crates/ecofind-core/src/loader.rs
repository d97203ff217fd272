//! Cancellable list loading
//!
//! A [`Loader`] is owned by whatever displays a list. Tearing the owner down
//! cancels the loader, and any load still in flight resolves to
//! [`LoadOutcome::Cancelled`] instead of delivering a stale result.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of a load raced against its owner's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// The load finished while the owner was alive
    Loaded(T),
    /// The owner went away first; the result was discarded
    Cancelled,
}

impl<T> LoadOutcome<T> {
    /// The loaded value, if any
    pub fn loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    /// Whether the result was discarded
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Cancellation scope for loads started by one owner
#[derive(Debug, Clone, Default)]
pub struct Loader {
    token: CancellationToken,
}

impl Loader {
    /// Fresh, live scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear the scope down; pending and future loads resolve to `Cancelled`
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the scope was torn down
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `load` unless the scope is cancelled first
    pub async fn run<F>(&self, load: F) -> LoadOutcome<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            () = self.token.cancelled() => {
                debug!("Load cancelled before completion");
                LoadOutcome::Cancelled
            }
            value = load => {
                if self.token.is_cancelled() {
                    debug!("Load finished after cancellation, result discarded");
                    LoadOutcome::Cancelled
                } else {
                    LoadOutcome::Loaded(value)
                }
            }
        }
    }
}
