//! Cancellation for in-flight requests tied to a screen's lifetime.
//!
//! A view owns a `RequestScope`; when the view goes away (scope dropped or cancelled)
//! any request still running through it resolves to `ClientError::Cancelled` and its
//! result is never applied.

use crate::error::{ClientError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default)]
pub struct RequestScope {
    token: CancellationToken,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope cancelled together with this one (but not the other way round).
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` unless the scope is cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("request abandoned by cancelled scope");
                Err(ClientError::Cancelled)
            }
            out = fut => out,
        }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
