//! Infrastructure layer for external integrations.
//!
//! Implements the storage contracts defined by the domain layer.
//!
//! - [`cache`] - Cache store and rate-limit window store (Redis, in-process)
//! - [`persistence`] - Durable short link store (PostgreSQL, in-process)

pub mod cache;
pub mod persistence;
