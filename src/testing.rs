//! Test doubles for the driver, the clock and the event observer.

use crate::core::{Clock, WebDriverTrait};
use crate::errors::{DriverError, FinderError, Result};
use crate::events::{FinderEvent, Observer};
use crate::types::{Selector, StrategyKind};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Scripted state of one element served by [`MockDriver`].
#[derive(Debug, Clone)]
pub struct MockNode {
    pub text: String,
    pub value: String,
    pub displayed: bool,
    pub enabled: bool,
    pub stale: bool,
    /// Lookups that miss before the element shows up.
    pub appears_after: u32,
    /// Clicks that fail before one succeeds.
    pub click_failures: u32,
}

impl MockNode {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            value: String::new(),
            displayed: true,
            enabled: true,
            stale: false,
            appears_after: 0,
            click_failures: 0,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    pub fn appears_after(mut self, lookups: u32) -> Self {
        self.appears_after = lookups;
        self
    }

    pub fn fails_clicks(mut self, count: u32) -> Self {
        self.click_failures = count;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    pub id: usize,
    pub selector: Selector,
}

#[derive(Debug, Default)]
struct MockState {
    nodes: Vec<MockNode>,
    by_selector: HashMap<Selector, usize>,
    invalid: HashSet<Selector>,
    lookups: HashMap<Selector, u32>,
    queries: Vec<Selector>,
    clicks: Vec<usize>,
    opened: Vec<String>,
}

/// In-memory driver answering lookups from a selector table.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, selector: Selector, node: MockNode) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.nodes.len();
            state.nodes.push(node);
            state.by_selector.insert(selector, id);
        }
        self
    }

    /// Make lookups of `selector` fail the way a browser rejects a
    /// malformed expression.
    pub fn with_invalid(self, selector: Selector) -> Self {
        self.state.lock().unwrap().invalid.insert(selector);
        self
    }

    /// Every selector queried, in order.
    pub fn queries(&self) -> Vec<Selector> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn lookups_for(&self, selector: &Selector) -> u32 {
        self.state
            .lock()
            .unwrap()
            .lookups
            .get(selector)
            .copied()
            .unwrap_or(0)
    }

    pub fn clicks(&self) -> Vec<usize> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn value_of(&self, selector: &Selector) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .by_selector
            .get(selector)
            .map(|id| state.nodes[*id].value.clone())
    }

    pub fn set_displayed(&self, selector: &Selector, displayed: bool) {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.by_selector.get(selector).copied() {
            state.nodes[id].displayed = displayed;
        }
    }

    fn with_node<T>(
        &self,
        element: &MockElement,
        f: impl FnOnce(&mut MockNode, &mut Vec<usize>) -> std::result::Result<T, DriverError>,
    ) -> std::result::Result<T, DriverError> {
        let mut state = self.state.lock().unwrap();
        let MockState { nodes, clicks, .. } = &mut *state;
        let node = nodes
            .get_mut(element.id)
            .ok_or(DriverError::StaleElement)?;
        if node.stale {
            return Err(DriverError::StaleElement);
        }
        f(node, clicks)
    }
}

#[async_trait]
impl WebDriverTrait for MockDriver {
    type Element = MockElement;

    async fn open(&self, url: &str) -> std::result::Result<(), DriverError> {
        self.state.lock().unwrap().opened.push(url.to_string());
        Ok(())
    }

    async fn find_one(
        &self,
        selector: &Selector,
    ) -> std::result::Result<Self::Element, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(selector.clone());
        let lookups = {
            let count = state.lookups.entry(selector.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if state.invalid.contains(selector) {
            return Err(DriverError::JavaScriptFailed(format!(
                "invalid selector {}",
                selector
            )));
        }

        match state.by_selector.get(selector) {
            Some(id) if lookups > state.nodes[*id].appears_after => Ok(MockElement {
                id: *id,
                selector: selector.clone(),
            }),
            _ => Err(DriverError::NoSuchElement(selector.to_string())),
        }
    }

    async fn is_displayed(&self, element: &Self::Element) -> std::result::Result<bool, DriverError> {
        self.with_node(element, |node, _| Ok(node.displayed))
    }

    async fn is_enabled(&self, element: &Self::Element) -> std::result::Result<bool, DriverError> {
        self.with_node(element, |node, _| Ok(node.enabled))
    }

    async fn click(&self, element: &Self::Element) -> std::result::Result<(), DriverError> {
        self.with_node(element, |node, clicks| {
            if node.click_failures > 0 {
                node.click_failures -= 1;
                return Err(DriverError::Interaction("click intercepted".to_string()));
            }
            clicks.push(element.id);
            Ok(())
        })
    }

    async fn clear(&self, element: &Self::Element) -> std::result::Result<(), DriverError> {
        self.with_node(element, |node, _| {
            node.value.clear();
            Ok(())
        })
    }

    async fn send_keys(
        &self,
        element: &Self::Element,
        text: &str,
    ) -> std::result::Result<(), DriverError> {
        self.with_node(element, |node, _| {
            node.value.push_str(text);
            Ok(())
        })
    }

    async fn get_text(&self, element: &Self::Element) -> std::result::Result<String, DriverError> {
        self.with_node(element, |node, _| Ok(node.text.clone()))
    }
}

/// Virtual clock: sleeps return immediately and advance `now()`.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
    interrupt_on: Option<usize>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
            interrupt_on: None,
        }
    }

    /// Fail the sleep with this zero-based index as interrupted.
    pub fn interrupt_on_sleep(mut self, index: usize) -> Self {
        self.interrupt_on = Some(index);
        self
    }

    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
    }

    /// Every completed sleep, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn sleeps_of(&self, duration: Duration) -> usize {
        self.sleeps().iter().filter(|d| **d == duration).count()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) -> Result<()> {
        let mut sleeps = self.sleeps.lock().unwrap();
        if self.interrupt_on == Some(sleeps.len()) {
            return Err(FinderError::InterruptedWait);
        }
        sleeps.push(duration);
        *self.elapsed.lock().unwrap() += duration;
        Ok(())
    }
}

/// Observer that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<FinderEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FinderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Strategies in the order they were tried, across all attempts.
    pub fn strategies_tried(&self) -> Vec<StrategyKind> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FinderEvent::StrategyFailed { strategy, .. }
                | FinderEvent::StrategySucceeded { strategy, .. } => Some(strategy),
                _ => None,
            })
            .collect()
    }

    pub fn attempts_started(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, FinderEvent::AttemptStarted { .. }))
            .count()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &FinderEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
