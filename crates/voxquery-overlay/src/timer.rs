//! Deferred restart after a language switch.
//!
//! The timer is owned by the session. Each schedule gets a fresh token; the
//! firing is delivered through the session's input channel and only honoured
//! if its token is still the pending one, so a firing that was already queued
//! when the timer got cancelled is recognised as stale.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use voxquery_core::error::VoxQueryError;

use crate::runtime::SessionInput;

#[derive(Debug)]
struct PendingRestart {
    token: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct RestartTimer {
    delay: Duration,
    next_token: u64,
    pending: Option<PendingRestart>,
}

impl RestartTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_token: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer, replacing any pending restart. Returns the new token.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, tx: &UnboundedSender<SessionInput>) -> Result<u64, VoxQueryError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| VoxQueryError::Session(format!("No async runtime for restart timer: {e}")))?;

        self.cancel();
        self.next_token += 1;
        let token = self.next_token;
        let delay = self.delay;
        let tx = tx.clone();

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionInput::RestartDue(token));
        });

        tracing::debug!(token, delay_ms = delay.as_millis() as u64, "Restart scheduled");
        self.pending = Some(PendingRestart { token, handle });
        Ok(token)
    }

    /// Cancel the pending restart, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.handle.abort();
                tracing::debug!(token = pending.token, "Restart cancelled");
                true
            }
            None => false,
        }
    }

    /// Consume the pending restart if `token` is current.
    ///
    /// Returns `false` for stale or unknown tokens.
    pub fn claim(&mut self, token: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.token == token => {
                if let Some(pending) = self.pending.take() {
                    pending.handle.abort();
                }
                true
            }
            _ => false,
        }
    }

    /// Token of the pending restart, if one is armed.
    pub fn pending_token(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.token)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for RestartTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
