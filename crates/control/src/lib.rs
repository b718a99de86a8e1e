//! Client-side control core for environmental stabilization.
//!
//! Couples a periodic metrics poller, the criticality classifier from
//! `ambient-core`, and a stabilization session controller around one
//! shared state record with single-owner mutation: exactly one operation
//! -- a scheduled fetch, a manual fetch, or a stabilization trigger -- may
//! touch the record at any instant.

pub mod controller;
pub mod events;
pub mod poller;
pub mod session;
pub mod state;
