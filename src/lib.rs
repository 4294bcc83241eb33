//! Self-healing element resolution for browser-driven tests.
//!
//! [`ElementResolver`] turns a locator string into a live, clickable element by
//! reading it as XPath, CSS, exact text and partial text in turn, and retries
//! the whole cascade through a [`RetryPolicy`]. Both keep counters that make
//! retry and fallback behavior observable.

#[cfg(feature = "chrome")]
pub mod browser;
pub mod core;
pub mod errors;
pub mod events;
pub mod finder;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

#[cfg(feature = "chrome")]
pub use browser::{ChromeDriver, ChromeElement};
pub use core::{Clock, Config, Interrupter, TokioClock, WebDriverTrait};
pub use errors::{DriverError, FinderError, Result};
pub use events::{FinderEvent, Observer, TracingObserver};
pub use finder::{ElementResolver, ElementResolverBuilder, MetricsReport, Resolution};
pub use retry::RetryPolicy;
pub use types::*;
