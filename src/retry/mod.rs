pub mod metrics;
pub mod policy;

pub use metrics::{RetryMetrics, RetryMetricsSnapshot};
pub use policy::RetryPolicy;
