use crate::core::{Clock, Config, TokioClock, WebDriverTrait};
use crate::errors::{DriverError, FinderError, Result};
use crate::events::{FinderEvent, Observer, TracingObserver};
use crate::finder::metrics::{FallbackMetrics, FallbackMetricsSnapshot, MetricsReport};
use crate::finder::strategy::STRATEGIES;
use crate::retry::RetryPolicy;
use crate::types::{RetryOutcome, RetrySettings, Selector, StrategyKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, Instrument};
use uuid::Uuid;

/// Element produced by one pass through the strategy cascade.
#[derive(Debug, Clone)]
pub struct StrategyMatch<E> {
    pub element: E,
    pub strategy: StrategyKind,
    pub index: usize,
}

/// Element produced by a retried find, with the attempt history.
#[derive(Debug, Clone)]
pub struct Resolution<E> {
    pub element: E,
    pub strategy: StrategyKind,
    pub outcome: RetryOutcome,
}

impl<E> Resolution<E> {
    pub fn used_fallback(&self) -> bool {
        self.outcome.strategy_used_index.unwrap_or(0) > 0
    }
}

/// Self-healing element lookup over a borrowed driver session.
///
/// A locator string is read as XPath, CSS selector, exact text and partial
/// text, in that order; the first reading that yields a displayed and enabled
/// element wins. The whole cascade runs inside a [`RetryPolicy`], so a miss on
/// every reading is retried as a unit.
///
/// A resolver owns its retry policy and counters. Build one per session and
/// do not share it across tests running in parallel.
pub struct ElementResolver<'d, D: WebDriverTrait> {
    id: Uuid,
    driver: &'d D,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    strategy_timeout: Duration,
    poll_interval: Duration,
    metrics: FallbackMetrics,
}

impl<'d, D: WebDriverTrait> ElementResolver<'d, D> {
    pub fn new(driver: &'d D) -> Self {
        Self::builder(driver).build()
    }

    pub fn builder(driver: &'d D) -> ElementResolverBuilder<'d, D> {
        ElementResolverBuilder::new(driver)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn driver(&self) -> &'d D {
        self.driver
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// One attempt: try every strategy in priority order until one yields a
    /// clickable element.
    pub async fn resolve_with_strategies(&self, locator: &str) -> Result<StrategyMatch<D::Element>> {
        for (index, (strategy, build)) in STRATEGIES.iter().enumerate() {
            let selector = build(locator);
            let found = match self.try_strategy(*strategy, &selector).await {
                Ok(element) => Some(element),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    debug!("{}", err);
                    None
                }
            };

            if let Some(element) = found {
                if self.is_clickable(&element).await {
                    if index > 0 {
                        self.metrics.record_fallback_success();
                    }
                    self.observer.on_event(&FinderEvent::StrategySucceeded {
                        strategy: *strategy,
                        index,
                        locator: locator.to_string(),
                    });
                    return Ok(StrategyMatch {
                        element,
                        strategy: *strategy,
                        index,
                    });
                }
                debug!("Element went stale after matching {}", selector);
            }
            self.observer.on_event(&FinderEvent::StrategyFailed {
                strategy: *strategy,
                locator: locator.to_string(),
            });
        }

        Err(FinderError::CascadeExhausted(locator.to_string()))
    }

    /// Poll one selector until it yields a clickable element or the
    /// per-strategy timeout elapses.
    async fn try_strategy(&self, strategy: StrategyKind, selector: &Selector) -> Result<D::Element> {
        let deadline = self.clock.now() + self.strategy_timeout;
        loop {
            match self.driver.find_one(selector).await {
                Ok(element) => {
                    if self.is_clickable(&element).await {
                        return Ok(element);
                    }
                }
                Err(DriverError::NoSuchElement(_)) | Err(DriverError::StaleElement) => {}
                Err(err) => {
                    debug!("Lookup of {} failed: {}", selector, err);
                    break;
                }
            }

            let now = self.clock.now();
            if now >= deadline {
                break;
            }
            self.clock
                .sleep(self.poll_interval.min(deadline - now))
                .await?;
        }

        Err(FinderError::StrategyNotFound {
            strategy,
            selector: selector.to_string(),
        })
    }

    /// Displayed and enabled; a stale handle counts as neither.
    async fn is_clickable(&self, element: &D::Element) -> bool {
        matches!(self.driver.is_displayed(element).await, Ok(true))
            && matches!(self.driver.is_enabled(element).await, Ok(true))
    }

    /// Retried find that also reports which strategy won and how many
    /// attempts it took. Counts as one element find.
    pub async fn resolve(
        &self,
        locator: &str,
        settings: RetrySettings,
    ) -> Result<Resolution<D::Element>> {
        settings.validate()?;
        self.metrics.record_find();
        let span = tracing::debug_span!("find_element", resolver = %self.id, locator);
        let (result, mut outcome) = self
            .retry
            .run(|| self.resolve_with_strategies(locator), settings)
            .instrument(span)
            .await;

        let matched = result?;
        outcome.strategy_used_index = Some(matched.index);
        Ok(Resolution {
            element: matched.element,
            strategy: matched.strategy,
            outcome,
        })
    }

    pub async fn find_element(&self, locator: &str) -> Result<D::Element> {
        self.find_element_with(locator, self.retry.defaults()).await
    }

    pub async fn find_element_with(
        &self,
        locator: &str,
        settings: RetrySettings,
    ) -> Result<D::Element> {
        Ok(self.resolve(locator, settings).await?.element)
    }

    pub async fn find_and_click(&self, locator: &str) -> Result<()> {
        self.find_and_click_with(locator, self.retry.defaults()).await
    }

    pub async fn find_and_click_with(&self, locator: &str, settings: RetrySettings) -> Result<()> {
        self.retry
            .execute_with(
                || async move {
                    let element = self.find_element_with(locator, settings).await?;
                    self.driver.click(&element).await?;
                    Ok(())
                },
                settings,
            )
            .await
    }

    /// Clear the field, then type `text` into it.
    pub async fn find_and_send_keys(&self, locator: &str, text: &str) -> Result<()> {
        self.find_and_send_keys_with(locator, text, self.retry.defaults())
            .await
    }

    pub async fn find_and_send_keys_with(
        &self,
        locator: &str,
        text: &str,
        settings: RetrySettings,
    ) -> Result<()> {
        self.retry
            .execute_with(
                || async move {
                    let element = self.find_element_with(locator, settings).await?;
                    self.driver.clear(&element).await?;
                    self.driver.send_keys(&element, text).await?;
                    Ok(())
                },
                settings,
            )
            .await
    }

    pub async fn find_and_get_text(&self, locator: &str) -> Result<String> {
        self.find_and_get_text_with(locator, self.retry.defaults())
            .await
    }

    pub async fn find_and_get_text_with(
        &self,
        locator: &str,
        settings: RetrySettings,
    ) -> Result<String> {
        self.retry
            .execute_with(
                || async move {
                    let element = self.find_element_with(locator, settings).await?;
                    Ok(self.driver.get_text(&element).await?)
                },
                settings,
            )
            .await
    }

    /// `Ok(false)` when the element could not be found; other failures such
    /// as an interrupted wait are still returned as errors.
    pub async fn element_exists(&self, locator: &str) -> Result<bool> {
        self.element_exists_with(locator, self.retry.defaults())
            .await
    }

    pub async fn element_exists_with(&self, locator: &str, settings: RetrySettings) -> Result<bool> {
        match self.find_element_with(locator, settings).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Same lookup as [`ElementResolver::find_element`], without counting as
    /// an element find.
    pub async fn wait_for_element(&self, locator: &str) -> Result<D::Element> {
        self.wait_for_element_with(locator, self.retry.defaults())
            .await
    }

    pub async fn wait_for_element_with(
        &self,
        locator: &str,
        settings: RetrySettings,
    ) -> Result<D::Element> {
        let matched = self
            .retry
            .execute_with(|| self.resolve_with_strategies(locator), settings)
            .await?;
        Ok(matched.element)
    }

    pub fn total_element_finds(&self) -> u64 {
        self.metrics.total_element_finds()
    }

    pub fn fallback_success_count(&self) -> u64 {
        self.metrics.fallback_success_count()
    }

    /// Fallback wins as a percentage of element finds; 0 before any find.
    pub fn fallback_success_rate(&self) -> f64 {
        self.metrics.fallback_success_rate()
    }

    pub fn fallback_metrics(&self) -> FallbackMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn all_metrics(&self) -> MetricsReport {
        MetricsReport {
            retry: self.retry.metrics(),
            fallback: self.metrics.snapshot(),
        }
    }

    pub fn print_fallback_metrics(&self) {
        println!("{}", self.fallback_metrics());
    }

    pub fn print_all_metrics(&self) {
        println!("{}", self.all_metrics());
    }

    /// Zero the resolver counters and those of its retry policy.
    pub fn reset_metrics(&self) {
        self.retry.reset_metrics();
        self.metrics.reset();
    }
}

pub struct ElementResolverBuilder<'d, D: WebDriverTrait> {
    driver: &'d D,
    defaults: RetrySettings,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    strategy_timeout: Duration,
    poll_interval: Duration,
}

impl<'d, D: WebDriverTrait> ElementResolverBuilder<'d, D> {
    pub fn new(driver: &'d D) -> Self {
        let config = Config::default();
        Self {
            driver,
            defaults: config.retry.settings(),
            clock: Arc::new(TokioClock::new()),
            observer: Arc::new(TracingObserver),
            strategy_timeout: config.finder.strategy_timeout(),
            poll_interval: config.finder.poll_interval(),
        }
    }

    /// Take retry defaults and polling bounds from `config`.
    pub fn config(mut self, config: &Config) -> Self {
        self.defaults = config.retry.settings();
        self.strategy_timeout = config.finder.strategy_timeout();
        self.poll_interval = config.finder.poll_interval();
        self
    }

    pub fn retry_settings(mut self, settings: RetrySettings) -> Self {
        self.defaults = settings;
        self
    }

    pub fn strategy_timeout(mut self, timeout: Duration) -> Self {
        self.strategy_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> ElementResolver<'d, D> {
        let retry = RetryPolicy::new()
            .with_defaults(self.defaults)
            .with_clock(self.clock.clone())
            .with_observer(self.observer.clone());

        ElementResolver {
            id: Uuid::new_v4(),
            driver: self.driver,
            retry,
            clock: self.clock,
            observer: self.observer,
            strategy_timeout: self.strategy_timeout,
            poll_interval: self.poll_interval,
            metrics: FallbackMetrics::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::strategy::selector_for;
    use crate::testing::{ManualClock, MockDriver, MockNode, RecordingObserver};
    use tokio_test::assert_ok;

    const LOCATOR: &str = "Login";

    fn sel(kind: StrategyKind) -> Selector {
        selector_for(kind, LOCATOR)
    }

    struct Harness {
        clock: Arc<ManualClock>,
        observer: Arc<RecordingObserver>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: Arc::new(ManualClock::new()),
                observer: Arc::new(RecordingObserver::new()),
            }
        }

        /// Single lookup per strategy, no retry delay.
        fn resolver<'d>(&self, driver: &'d MockDriver) -> ElementResolver<'d, MockDriver> {
            ElementResolver::builder(driver)
                .clock(self.clock.clone())
                .observer(self.observer.clone())
                .retry_settings(RetrySettings::new(3, 0))
                .strategy_timeout(Duration::ZERO)
                .build()
        }
    }

    fn cascade() -> Vec<Selector> {
        STRATEGIES.iter().map(|(kind, _)| sel(*kind)).collect()
    }

    #[tokio::test]
    async fn test_absent_locator_exhausts_three_full_cascades() {
        let harness = Harness::new();
        let driver = MockDriver::new();
        let resolver = harness.resolver(&driver);

        let result = resolver.find_element(LOCATOR).await;

        match result {
            Err(FinderError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, FinderError::CascadeExhausted(ref l) if l == LOCATOR));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other.map(|_| ())),
        }
        let expected: Vec<Selector> = (0..3).flat_map(|_| cascade()).collect();
        assert_eq!(driver.queries(), expected);
        assert_eq!(harness.observer.attempts_started(), 3);
        assert_eq!(harness.clock.sleeps(), vec![Duration::ZERO; 2]);
        assert_eq!(resolver.total_element_finds(), 1);
        assert_eq!(resolver.retry_policy().total_retries(), 3);
        assert_eq!(resolver.fallback_success_count(), 0);
    }

    #[tokio::test]
    async fn test_exact_text_fallback_on_first_attempt() {
        let harness = Harness::new();
        let driver =
            MockDriver::new().with_element(sel(StrategyKind::ExactText), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        let resolution = assert_ok!(resolver.resolve(LOCATOR, RetrySettings::new(3, 0)).await);

        assert_eq!(resolution.strategy, StrategyKind::ExactText);
        assert_eq!(resolution.outcome.strategy_used_index, Some(2));
        assert_eq!(resolution.outcome.attempts_made, 1);
        assert!(resolution.used_fallback());
        assert_eq!(
            driver.queries(),
            vec![
                sel(StrategyKind::Xpath),
                sel(StrategyKind::CssSelector),
                sel(StrategyKind::ExactText)
            ]
        );
        assert_eq!(resolver.fallback_success_count(), 1);
        assert_eq!(resolver.retry_policy().total_retries(), 0);
        assert_eq!(resolver.fallback_success_rate(), 100.0);
    }

    #[tokio::test]
    async fn test_primary_success_is_not_a_fallback() {
        let harness = Harness::new();
        let driver =
            MockDriver::new().with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        assert_ok!(resolver.find_element(LOCATOR).await);
        assert_eq!(driver.queries(), vec![sel(StrategyKind::Xpath)]);
        assert_eq!(resolver.fallback_success_count(), 0);
        assert_eq!(resolver.fallback_success_rate(), 0.0);
        assert_eq!(
            harness.observer.strategies_tried(),
            vec![StrategyKind::Xpath]
        );
    }

    #[tokio::test]
    async fn test_hidden_or_disabled_match_moves_to_next_strategy() {
        let harness = Harness::new();
        let driver = MockDriver::new()
            .with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR).hidden())
            .with_element(sel(StrategyKind::CssSelector), MockNode::new(LOCATOR).disabled())
            .with_element(sel(StrategyKind::PartialText), MockNode::new("Login here"));
        let resolver = harness.resolver(&driver);

        let resolution = assert_ok!(resolver.resolve(LOCATOR, RetrySettings::new(1, 0)).await);
        assert_eq!(resolution.strategy, StrategyKind::PartialText);
        assert_eq!(
            harness.observer.strategies_tried(),
            vec![
                StrategyKind::Xpath,
                StrategyKind::CssSelector,
                StrategyKind::ExactText,
                StrategyKind::PartialText
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_element_counts_as_not_found() {
        let harness = Harness::new();
        let driver = MockDriver::new()
            .with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR).stale())
            .with_element(sel(StrategyKind::CssSelector), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        let resolution = assert_ok!(resolver.resolve(LOCATOR, RetrySettings::new(1, 0)).await);
        assert_eq!(resolution.strategy, StrategyKind::CssSelector);
        assert_eq!(resolver.fallback_success_count(), 1);
    }

    #[tokio::test]
    async fn test_element_found_on_second_attempt() {
        let harness = Harness::new();
        // One miss per attempt, so the xpath reading succeeds on attempt 2.
        let driver = MockDriver::new()
            .with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR).appears_after(1));
        let resolver = harness.resolver(&driver);

        let resolution = assert_ok!(resolver.resolve(LOCATOR, RetrySettings::new(3, 1)).await);
        assert_eq!(resolution.outcome.attempts_made, 2);
        assert_eq!(resolution.strategy, StrategyKind::Xpath);
        assert_eq!(harness.clock.sleeps(), vec![Duration::from_secs(1)]);
        assert_eq!(resolver.retry_policy().successful_retries(), 1);
        assert_eq!(resolver.retry_policy().retry_success_rate(), 100.0);
        assert_eq!(resolver.fallback_success_count(), 0);
    }

    #[tokio::test]
    async fn test_strategy_polls_until_element_appears() {
        let harness = Harness::new();
        let driver = MockDriver::new()
            .with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR).appears_after(3));
        let resolver = ElementResolver::builder(&driver)
            .clock(harness.clock.clone())
            .strategy_timeout(Duration::from_secs(20))
            .poll_interval(Duration::from_millis(500))
            .build();

        assert_ok!(resolver.find_element(LOCATOR).await);
        assert_eq!(driver.lookups_for(&sel(StrategyKind::Xpath)), 4);
        assert_eq!(harness.clock.sleeps(), vec![Duration::from_millis(500); 3]);
        assert_eq!(resolver.retry_policy().total_retries(), 0);
    }

    #[tokio::test]
    async fn test_strategy_timeout_bounds_polling() {
        let harness = Harness::new();
        let driver = MockDriver::new();
        let resolver = ElementResolver::builder(&driver)
            .clock(harness.clock.clone())
            .strategy_timeout(Duration::from_millis(2000))
            .poll_interval(Duration::from_millis(600))
            .build();

        let result = resolver
            .find_element_with(LOCATOR, RetrySettings::new(1, 0))
            .await;
        assert!(result.unwrap_err().is_not_found());

        // Lookups at 0, 600, 1200, 1800 and 2000ms for each strategy.
        for selector in cascade() {
            assert_eq!(driver.lookups_for(&selector), 5);
        }
        let per_strategy = vec![
            Duration::from_millis(600),
            Duration::from_millis(600),
            Duration::from_millis(600),
            Duration::from_millis(200),
        ];
        assert_eq!(harness.clock.sleeps(), per_strategy.repeat(4));
    }

    #[tokio::test]
    async fn test_interrupted_poll_aborts_without_retry() {
        let clock = Arc::new(ManualClock::new().interrupt_on_sleep(0));
        let driver = MockDriver::new();
        let resolver = ElementResolver::builder(&driver)
            .clock(clock.clone())
            .strategy_timeout(Duration::from_secs(5))
            .build();

        let result = resolver.find_element(LOCATOR).await;
        assert!(matches!(result, Err(FinderError::InterruptedWait)));
        assert_eq!(driver.queries(), vec![sel(StrategyKind::Xpath)]);
        assert_eq!(resolver.retry_policy().total_retries(), 1);
        assert_eq!(resolver.total_element_finds(), 1);
    }

    #[tokio::test]
    async fn test_element_exists() {
        let harness = Harness::new();
        let driver =
            MockDriver::new().with_element(sel(StrategyKind::CssSelector), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        assert!(assert_ok!(resolver.element_exists(LOCATOR).await));
        assert!(!assert_ok!(resolver.element_exists("Logout").await));
        assert_eq!(resolver.total_element_finds(), 2);
        assert_eq!(resolver.fallback_success_count(), 1);
        assert_eq!(resolver.fallback_success_rate(), 50.0);
    }

    #[tokio::test]
    async fn test_element_exists_propagates_interruption() {
        let clock = Arc::new(ManualClock::new().interrupt_on_sleep(0));
        let driver = MockDriver::new();
        let resolver = ElementResolver::builder(&driver)
            .clock(clock)
            .strategy_timeout(Duration::ZERO)
            .build();

        let result = resolver.element_exists(LOCATOR).await;
        assert!(matches!(result, Err(FinderError::InterruptedWait)));
    }

    #[tokio::test]
    async fn test_find_and_click_retries_failed_click() {
        let harness = Harness::new();
        let driver = MockDriver::new()
            .with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR).fails_clicks(1));
        let resolver = harness.resolver(&driver);

        assert_ok!(resolver.find_and_click(LOCATOR).await);
        assert_eq!(driver.clicks(), vec![0]);
        assert_eq!(resolver.total_element_finds(), 2);
        // Outer operation plus one inner find per outer attempt.
        assert_eq!(resolver.retry_policy().total_operations(), 3);
        assert_eq!(resolver.retry_policy().successful_retries(), 1);
    }

    #[tokio::test]
    async fn test_find_and_click_absent_nests_retries() {
        let harness = Harness::new();
        let driver = MockDriver::new();
        let resolver = harness.resolver(&driver);

        let err = resolver
            .find_and_click_with(LOCATOR, RetrySettings::new(2, 0))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(driver.queries().len(), 2 * 2 * STRATEGIES.len());
        assert!(driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_find_and_send_keys_clears_first() {
        let harness = Harness::new();
        let selector = sel(StrategyKind::CssSelector);
        let driver = MockDriver::new()
            .with_element(selector.clone(), MockNode::new("").with_value("stale input"));
        let resolver = harness.resolver(&driver);

        assert_ok!(resolver.find_and_send_keys(LOCATOR, "admin").await);
        assert_eq!(driver.value_of(&selector).as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_find_and_get_text() {
        let harness = Harness::new();
        let driver = MockDriver::new()
            .with_element(sel(StrategyKind::PartialText), MockNode::new("Login to continue"));
        let resolver = harness.resolver(&driver);

        let text = assert_ok!(resolver.find_and_get_text(LOCATOR).await);
        assert_eq!(text, "Login to continue");
    }

    #[tokio::test]
    async fn test_wait_for_element_does_not_count_as_find() {
        let harness = Harness::new();
        let driver =
            MockDriver::new().with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        assert_ok!(resolver.wait_for_element(LOCATOR).await);
        assert_eq!(resolver.total_element_finds(), 0);
        assert_eq!(resolver.retry_policy().total_operations(), 1);
    }

    #[tokio::test]
    async fn test_reset_metrics_zeroes_everything() {
        let harness = Harness::new();
        let driver =
            MockDriver::new().with_element(sel(StrategyKind::ExactText), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        assert_ok!(resolver.find_element(LOCATOR).await);
        assert!(!assert_ok!(resolver.element_exists("Missing").await));
        assert!(resolver.fallback_success_rate() > 0.0);
        assert!(resolver.retry_policy().total_retries() > 0);

        resolver.reset_metrics();

        let report = resolver.all_metrics();
        assert_eq!(report.retry.total_operations, 0);
        assert_eq!(report.retry.total_retries, 0);
        assert_eq!(report.retry.successful_retries, 0);
        assert_eq!(report.fallback.total_element_finds, 0);
        assert_eq!(report.fallback.fallback_success_count, 0);
        assert_eq!(resolver.fallback_success_rate(), 0.0);
        assert_eq!(resolver.retry_policy().retry_success_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_css_only_locator_wins_at_css_strategy() {
        let harness = Harness::new();
        let driver = MockDriver::new()
            .with_invalid(Selector::XPath("#go".to_string()))
            .with_element(Selector::Css("#go".to_string()), MockNode::new("Go"));
        let resolver = ElementResolver::builder(&driver)
            .clock(harness.clock.clone())
            .retry_settings(RetrySettings::new(3, 0))
            .build();

        let resolution = assert_ok!(resolver.resolve("#go", RetrySettings::new(3, 0)).await);
        assert_eq!(resolution.strategy, StrategyKind::CssSelector);
        assert_eq!(resolution.outcome.strategy_used_index, Some(1));
        assert!(resolution.used_fallback());
        assert_eq!(resolver.fallback_success_count(), 1);

        // A rejected expression ends its strategy without polling.
        assert_eq!(driver.lookups_for(&Selector::XPath("#go".to_string())), 1);
        assert!(harness.clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected_before_counting_a_find() {
        let harness = Harness::new();
        let driver =
            MockDriver::new().with_element(sel(StrategyKind::Xpath), MockNode::new(LOCATOR));
        let resolver = harness.resolver(&driver);

        let result = resolver
            .find_element_with(LOCATOR, RetrySettings::new(0, 0))
            .await;
        assert!(matches!(result, Err(FinderError::Configuration(_))));
        assert_eq!(resolver.total_element_finds(), 0);
        assert_eq!(resolver.retry_policy().total_operations(), 0);
        assert!(driver.queries().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_report_renders_both_sections() {
        let harness = Harness::new();
        let driver = MockDriver::new();
        let resolver = harness.resolver(&driver);

        let report = resolver.all_metrics().to_string();
        assert!(report.contains("=== Retry Metrics ==="));
        assert!(report.contains("=== Fallback Strategy Metrics ==="));
    }

    #[tokio::test]
    async fn test_resolvers_keep_separate_counters() {
        let harness = Harness::new();
        let driver_a =
            MockDriver::new().with_element(sel(StrategyKind::CssSelector), MockNode::new(LOCATOR));
        let driver_b = MockDriver::new();
        let a = harness.resolver(&driver_a);
        let b = harness.resolver(&driver_b);

        assert_ok!(a.find_element(LOCATOR).await);
        assert_eq!(a.total_element_finds(), 1);
        assert_eq!(b.total_element_finds(), 0);
        assert_ne!(a.id(), b.id());
    }
}
