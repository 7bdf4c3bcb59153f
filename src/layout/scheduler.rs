//! Coalescing flush scheduler.
//!
//! Bursts of reflow-triggering events (split, resize drag, dock toggles)
//! are coalesced into a single trailing-edge flush: one dirty signal, one
//! fixed-delay task, cancel-and-reschedule on every new signal. The owner
//! recomputes bounds and persists the layout when the signal arrives.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub struct FlushScheduler {
    delay: Duration,
    handle: tokio::runtime::Handle,
    notify: UnboundedSender<()>,
    pending: Option<JoinHandle<()>>,
}

impl FlushScheduler {
    pub fn new(
        handle: tokio::runtime::Handle,
        delay: Duration,
        notify: UnboundedSender<()>,
    ) -> Self {
        Self {
            delay,
            handle,
            notify,
            pending: None,
        }
    }

    /// Signal that the layout is dirty. Restarts the delay; only the last
    /// signal in a burst produces a flush.
    pub fn mark_dirty(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let delay = self.delay;
        let notify = self.notify.clone();
        self.pending = Some(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = notify.send(());
        }));
    }

    /// Drop any pending flush without firing it.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
