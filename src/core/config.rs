use crate::errors::{FinderError, Result};
use crate::types::{RetrySettings, DEFAULT_DELAY_SECS, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub retry: RetryConfig,
    pub finder: FinderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub disable_images: bool,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Upper bound on polling for one strategy.
    pub strategy_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Config {
    /// Load a JSON config file; missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(FinderError::Configuration(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.finder.poll_interval_ms == 0 {
            return Err(FinderError::Configuration(
                "finder.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl RetryConfig {
    pub fn settings(&self) -> RetrySettings {
        RetrySettings::new(self.max_attempts, self.delay_secs)
    }
}

impl FinderConfig {
    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_millis(self.strategy_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            disable_images: false,
            args: vec![
                "--start-maximized".to_string(),
                "--disable-notifications".to_string(),
            ],
            timeout_ms: 30000,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_secs: DEFAULT_DELAY_SECS,
        }
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            strategy_timeout_ms: 20000,
            poll_interval_ms: 500,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}
