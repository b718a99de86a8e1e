//! Pure domain logic for the environmental control core.
//!
//! Contains the metrics snapshot type, the fixed safety thresholds, and
//! the criticality classifier. Everything here is synchronous and free of
//! I/O so it can be tested in isolation.

pub mod classify;
pub mod metrics;
pub mod thresholds;
