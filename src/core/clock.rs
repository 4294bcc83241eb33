use crate::errors::{FinderError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Time source and sleeper used by retry delays and strategy polling.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`. Fails with
    /// [`FinderError::InterruptedWait`] if the wait is cancelled.
    async fn sleep(&self, duration: Duration) -> Result<()>;
}

/// Wall-clock implementation backed by `tokio::time`.
#[derive(Debug, Clone)]
pub struct TokioClock {
    interrupt: Arc<watch::Sender<bool>>,
}

impl TokioClock {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            interrupt: Arc::new(tx),
        }
    }

    /// Handle that cancels any current or future sleep on this clock.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            signal: self.interrupt.clone(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) -> Result<()> {
        let mut rx = self.interrupt.subscribe();
        if *rx.borrow() {
            return Err(FinderError::InterruptedWait);
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            // The sender lives in `self`, so the channel cannot close here.
            _ = rx.wait_for(|interrupted| *interrupted) => Err(FinderError::InterruptedWait),
        }
    }
}

/// Cancels sleeps of the [`TokioClock`] it was taken from.
#[derive(Debug, Clone)]
pub struct Interrupter {
    signal: Arc<watch::Sender<bool>>,
}

impl Interrupter {
    pub fn interrupt(&self) {
        self.signal.send_replace(true);
    }

    /// Clear a previous interrupt so the clock can sleep again.
    pub fn reset(&self) {
        self.signal.send_replace(false);
    }

    pub fn is_interrupted(&self) -> bool {
        *self.signal.borrow()
    }
}
