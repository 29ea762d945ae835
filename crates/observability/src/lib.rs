//! # callrelay-observability
//!
//! Observability-Crate fuer callrelay:
//! - Liveness-Endpunkt (`/`) und Health-Check (`/health`)
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Structured Logging via tracing-subscriber
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, liveness_router, HealthResponse, HealthStatus, StatusQuelle};
pub use logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren, LogFormat};
pub use metrics::{metrics_router, RelayMetrics};
pub use middleware::{request_timing_layer, timing_middleware};
