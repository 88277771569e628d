//! Core services: identifier generation, resolution and rate limiting.

pub mod link_service;
pub mod rate_limit_service;
pub mod resolver_service;

pub use link_service::{CodeGeneratorConfig, LinkService};
pub use rate_limit_service::RateLimitService;
pub use resolver_service::ResolverService;
