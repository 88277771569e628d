//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for durable storage; implementations live in
//! `crate::infrastructure::persistence`, mocks are generated via `mockall`.

pub mod short_link_repository;

pub use short_link_repository::ShortLinkRepository;

#[cfg(test)]
pub use short_link_repository::MockShortLinkRepository;
