//! HTTP client library for the Telemetry & Actuation Service.
//!
//! Wraps the two endpoints the control core consumes -- the latest-reading
//! fetch and the long-running stabilization call -- behind typed response
//! structs and a small error taxonomy.

pub mod api;
pub mod messages;
