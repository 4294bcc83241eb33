pub mod metrics;
pub mod resolver;
pub mod strategy;

pub use metrics::{FallbackMetrics, FallbackMetricsSnapshot, MetricsReport};
pub use resolver::{ElementResolver, ElementResolverBuilder, Resolution, StrategyMatch};
pub use strategy::{selector_for, selector_for_name, xpath_literal, SelectorBuilder, STRATEGIES};
