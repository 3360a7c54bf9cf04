//! truthpulse-core — Response model, scoring, and aggregate metrics.
//!
//! This crate defines the survey response data model, the per-session
//! scorer, the aggregate metrics fold, and the storage traits that the rest
//! of truthpulse builds on.

pub mod catalog;
pub mod error;
pub mod export;
pub mod model;
pub mod recorder;
pub mod scan;
pub mod scorer;
pub mod session;
pub mod statistics;
pub mod traits;
