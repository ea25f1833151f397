//! Prometheus metrics endpoint and HTTP metrics middleware

pub mod handlers;
pub mod middleware;

pub use handlers::{install_recorder, prometheus_metrics, MetricsState};
pub use middleware::http_metrics_middleware;
