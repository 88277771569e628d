//! Core domain entities.
//!
//! - [`ShortLink`] - A code → target mapping with click metadata
//! - [`NewShortLink`] - Input for inserting a short link
//! - [`RateWindowEntry`] - A marker in a sliding rate-limit window
//! - [`RateDecision`] - Result of an admission check

pub mod rate_window;
pub mod short_link;

pub use rate_window::{RateDecision, RateWindowEntry};
pub use short_link::{NewShortLink, ShortLink};
