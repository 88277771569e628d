//! HTTP middleware for request processing and protection.
//!
//! Provides caller identity extraction, rate limiting, and observability middleware.

pub mod owner;
pub mod rate_limit;
pub mod tracing;
