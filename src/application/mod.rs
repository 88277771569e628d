//! Application layer services.
//!
//! Services depend only on the capability traits in [`crate::domain`] and
//! [`crate::infrastructure::cache`], so the Postgres and Redis backends can be
//! swapped for in-process ones.
//!
//! - [`services::LinkService`] - short link creation with collision retry
//! - [`services::ResolverService`] - cache-aside code resolution
//! - [`services::RateLimitService`] - sliding-window admission checks

pub mod services;
