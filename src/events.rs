//! Structured progress events for retry attempts and strategy resolution.
//!
//! Components never print progress themselves; they hand a [`FinderEvent`] to
//! the injected [`Observer`]. [`TracingObserver`] is the default and writes the
//! events to `tracing`.

use crate::types::StrategyKind;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FinderEvent {
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
    },
    AttemptFailed {
        attempt: u32,
        error: String,
    },
    RetryScheduled {
        attempt: u32,
        delay_ms: u64,
    },
    RetrySucceeded {
        attempt: u32,
    },
    RetriesExhausted {
        attempts: u32,
    },
    StrategyFailed {
        strategy: StrategyKind,
        locator: String,
    },
    StrategySucceeded {
        strategy: StrategyKind,
        index: usize,
        locator: String,
    },
}

impl FinderEvent {
    pub fn is_fallback_success(&self) -> bool {
        matches!(self, FinderEvent::StrategySucceeded { index, .. } if *index > 0)
    }
}

pub trait Observer: Send + Sync {
    fn on_event(&self, event: &FinderEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &FinderEvent) {
        match event {
            FinderEvent::AttemptStarted {
                attempt,
                max_attempts,
            } => debug!("Attempt {} of {}", attempt, max_attempts),
            FinderEvent::AttemptFailed { attempt, error } => {
                warn!("Attempt {} failed: {}", attempt, error)
            }
            FinderEvent::RetryScheduled { delay_ms, .. } => {
                debug!("Waiting {}ms before retry", delay_ms)
            }
            FinderEvent::RetrySucceeded { attempt } => {
                info!("Retry succeeded on attempt {}", attempt)
            }
            FinderEvent::RetriesExhausted { attempts } => {
                warn!("All {} attempts failed", attempts)
            }
            FinderEvent::StrategyFailed { strategy, locator } => {
                debug!("Strategy {} failed for locator: {}", strategy, locator)
            }
            FinderEvent::StrategySucceeded {
                strategy,
                index,
                locator,
            } => {
                if *index > 0 {
                    info!("Fallback strategy {} succeeded for: {}", strategy, locator);
                } else {
                    debug!("Primary strategy {} succeeded for: {}", strategy, locator);
                }
            }
        }
    }
}
