//! Utility functions used across the application.
//!
//! - [`code_generator`] - Random short code generation
//! - [`target_url`] - Target address validation and normalization
//! - [`client_ip`] - Client address extraction for rate limiting

pub mod client_ip;
pub mod code_generator;
pub mod target_url;
