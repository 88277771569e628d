//! Domain layer containing business entities and storage contracts.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Durable store trait definitions
//! - [`clock`] - Time source abstraction
//! - [`health`] - Backend liveness probe
//! - [`click_event`] - Click accounting event and queue
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. The resolver returns a link to its caller
//! 2. A [`click_event::ClickEvent`] is pushed onto the unbounded queue
//! 3. [`click_worker::run_click_worker`] spawns one increment per event
//! 4. The count is bumped via [`repositories::ShortLinkRepository::increment_click_count`]

pub mod click_event;
pub mod click_worker;
pub mod clock;
pub mod entities;
pub mod health;
pub mod repositories;
