//! HTTP API handlers for truthpulse

pub mod analytics;
pub mod export;
pub mod health;
pub mod metrics;
pub mod seed;

pub use analytics::record_response;
pub use export::{download_csv, download_xlsx};
pub use health::health_routes;
pub use metrics::get_metrics;
pub use seed::seed_record;
