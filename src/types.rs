use crate::errors::FinderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_SECS: u64 = 2;

/// One interpretation of a locator expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Xpath,
    CssSelector,
    ExactText,
    PartialText,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Xpath => "xpath",
            StrategyKind::CssSelector => "css",
            StrategyKind::ExactText => "text",
            StrategyKind::PartialText => "partial_text",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xpath" => Ok(StrategyKind::Xpath),
            "css" | "css_selector" => Ok(StrategyKind::CssSelector),
            "text" | "exact_text" => Ok(StrategyKind::ExactText),
            "partial_text" => Ok(StrategyKind::PartialText),
            other => Err(FinderError::InvalidStrategy(other.to_string())),
        }
    }
}

/// A concrete query the driver understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    XPath(String),
    Css(String),
}

impl Selector {
    pub fn as_str(&self) -> &str {
        match self {
            Selector::XPath(query) | Selector::Css(query) => query,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::XPath(query) => write!(f, "xpath={}", query),
            Selector::Css(query) => write!(f, "css={}", query),
        }
    }
}

/// Per-call retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetrySettings {
    pub fn new(max_attempts: u32, delay_secs: u64) -> Self {
        Self {
            max_attempts,
            delay: Duration::from_secs(delay_secs),
        }
    }

    pub fn with_delay(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// At least one attempt is required.
    pub fn validate(&self) -> Result<(), FinderError> {
        if self.max_attempts == 0 {
            return Err(FinderError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY_SECS)
    }
}

/// What happened during one retried call. Lives only until it is folded into
/// the aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RetryOutcome {
    pub attempts_made: u32,
    pub succeeded: bool,
    pub strategy_used_index: Option<usize>,
}
