//! Cancelable waits
//!
//! The CLI flips a `watch` channel to `true` on Ctrl+C or SIGTERM. Poll and
//! settle waits race that flag so an operator can stop a run between steps.
//! Transfers check it only between files.

use crate::domain::{OffboardError, Result};
use std::time::Duration;
use tokio::sync::watch;

/// Receiver side of the shutdown flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl ShutdownSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    /// A signal that never fires
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fails with [`OffboardError::Cancelled`] if shutdown has been requested
    pub fn check(&self, what: &str) -> Result<()> {
        if self.is_requested() {
            return Err(OffboardError::Cancelled(format!("Shutdown requested before {what}")));
        }
        Ok(())
    }

    /// Sleeps for `duration` unless shutdown is requested first
    pub async fn sleep(&self, duration: Duration, what: &str) -> Result<()> {
        self.check(what)?;

        let mut rx = match &self.rx {
            Some(rx) => rx.clone(),
            None => {
                tokio::time::sleep(duration).await;
                return Ok(());
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = wait_for_shutdown(&mut rx) => {
                Err(OffboardError::Cancelled(format!("Shutdown requested during {what}")))
            }
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|requested| *requested).await.is_err() {
        // Sender gone: shutdown can no longer be requested
        std::future::pending::<()>().await;
    }
}
