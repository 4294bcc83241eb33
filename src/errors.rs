use crate::types::StrategyKind;
use thiserror::Error;

/// Failures reported by a [`crate::core::WebDriverTrait`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Stale element reference")]
    StaleElement,

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Element interaction failed: {0}")]
    Interaction(String),
}

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Strategy {strategy} found nothing for selector: {selector}")]
    StrategyNotFound {
        strategy: StrategyKind,
        selector: String,
    },

    #[error("Element not found using any strategy: {0}")]
    CascadeExhausted(String),

    #[error("All {attempts} attempts failed: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<FinderError>,
    },

    #[error("Unsupported locator strategy: {0}")]
    InvalidStrategy(String),

    #[error("Wait interrupted")]
    InterruptedWait,

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FinderError>;

impl FinderError {
    /// Whether a retry loop may run the failed operation again.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            FinderError::InvalidStrategy(_)
                | FinderError::InterruptedWait
                | FinderError::Configuration(_)
                | FinderError::Serialization(_)
                | FinderError::Io(_)
        )
    }

    /// Whether this failure ultimately means "the element is not there".
    pub fn is_not_found(&self) -> bool {
        match self.root_cause() {
            FinderError::StrategyNotFound { .. } | FinderError::CascadeExhausted(_) => true,
            FinderError::Driver(DriverError::NoSuchElement(_))
            | FinderError::Driver(DriverError::StaleElement) => true,
            _ => false,
        }
    }

    /// Innermost failure, looking through nested `RetriesExhausted` layers.
    pub fn root_cause(&self) -> &FinderError {
        let mut current = self;
        while let FinderError::RetriesExhausted { source, .. } = current {
            current = source;
        }
        current
    }
}
