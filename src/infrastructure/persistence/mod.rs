//! Durable store implementations.
//!
//! - [`PgShortLinkRepository`] - PostgreSQL via SQLx
//! - [`MemoryShortLinkRepository`] - In-process store with the same uniqueness semantics

pub mod memory_short_link_repository;
pub mod pg_short_link_repository;

pub use memory_short_link_repository::MemoryShortLinkRepository;
pub use pg_short_link_repository::PgShortLinkRepository;
