use crate::core::{Clock, TokioClock};
use crate::errors::{FinderError, Result};
use crate::events::{FinderEvent, Observer, TracingObserver};
use crate::retry::metrics::{RetryMetrics, RetryMetricsSnapshot};
use crate::types::{RetryOutcome, RetrySettings};
use std::future::Future;
use std::sync::Arc;

/// Bounded retry with a fixed delay between failed attempts.
///
/// Every call to [`RetryPolicy::execute`] counts as one operation; every
/// failed attempt counts as a retry, and an operation that only succeeds on a
/// later attempt counts as a successful retry. Failures that are not
/// retryable (see [`FinderError::is_retryable`]) end the call at once, and an
/// interrupted delay is returned as [`FinderError::InterruptedWait`].
pub struct RetryPolicy {
    defaults: RetrySettings,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    metrics: RetryMetrics,
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self {
            defaults: RetrySettings::default(),
            clock: Arc::new(TokioClock::new()),
            observer: Arc::new(TracingObserver),
            metrics: RetryMetrics::default(),
        }
    }

    pub fn with_defaults(mut self, settings: RetrySettings) -> Self {
        self.defaults = settings;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn defaults(&self) -> RetrySettings {
        self.defaults
    }

    /// Run `operation` under the default settings.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with(operation, self.defaults).await
    }

    pub async fn execute_with<T, F, Fut>(&self, operation: F, settings: RetrySettings) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run(operation, settings).await.0
    }

    /// Like [`RetryPolicy::execute_with`], also reporting how the call went.
    pub async fn run<T, F, Fut>(
        &self,
        mut operation: F,
        settings: RetrySettings,
    ) -> (Result<T>, RetryOutcome)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut outcome = RetryOutcome::default();
        if let Err(err) = settings.validate() {
            return (Err(err), outcome);
        }

        self.metrics.record_operation();

        let max_attempts = settings.max_attempts;
        let mut attempt = 1;
        loop {
            outcome.attempts_made = attempt;
            self.observer.on_event(&FinderEvent::AttemptStarted {
                attempt,
                max_attempts,
            });

            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        self.metrics.record_successful_retry();
                        self.observer
                            .on_event(&FinderEvent::RetrySucceeded { attempt });
                    }
                    outcome.succeeded = true;
                    return (Ok(value), outcome);
                }
                Err(err) => err,
            };

            self.metrics.record_failure();
            self.observer.on_event(&FinderEvent::AttemptFailed {
                attempt,
                error: err.to_string(),
            });

            if !err.is_retryable() {
                return (Err(err), outcome);
            }

            if attempt >= max_attempts {
                self.observer
                    .on_event(&FinderEvent::RetriesExhausted { attempts: attempt });
                return (
                    Err(FinderError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    }),
                    outcome,
                );
            }

            self.observer.on_event(&FinderEvent::RetryScheduled {
                attempt,
                delay_ms: settings.delay.as_millis() as u64,
            });
            if let Err(interrupted) = self.clock.sleep(settings.delay).await {
                return (Err(interrupted), outcome);
            }
            attempt += 1;
        }
    }

    pub fn metrics(&self) -> RetryMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn total_operations(&self) -> u64 {
        self.metrics.total_operations()
    }

    pub fn total_retries(&self) -> u64 {
        self.metrics.total_retries()
    }

    pub fn successful_retries(&self) -> u64 {
        self.metrics.successful_retries()
    }

    /// Successful retries as a percentage of failed attempts; 0 before any failure.
    pub fn retry_success_rate(&self) -> f64 {
        self.metrics.retry_success_rate()
    }

    pub fn print_metrics(&self) {
        println!("{}", self.metrics());
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
