use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::navigator::Msg;

/// Runs the navigator's auto-reset countdown.
///
/// At most one countdown is armed. When it runs out it delivers
/// `Msg::AutoResetElapsed(token)`; the reducer drops stale tokens, so a
/// countdown that lost a race with cancellation is harmless.
pub struct InactivityTimer {
    tx: mpsc::UnboundedSender<Msg>,
    pending: Option<JoinHandle<()>>,
}

impl InactivityTimer {
    pub fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self { tx, pending: None }
    }

    /// Arms the countdown, replacing any running one.
    pub fn schedule(&mut self, token: u64, after: Duration) {
        self.cancel();
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(Msg::AutoResetElapsed(token));
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
