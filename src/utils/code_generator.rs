//! Short code generation.

use rand::{Rng, distr::Alphanumeric};

/// First path segments owned by other routes; a link with one of these codes
/// could never be reached.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Generates a random code of `length` characters from `[A-Za-z0-9]`.
///
/// With 62 symbols per position an 8-character code has ~2.2e14 possible
/// values, so collisions are rare and handled by regeneration.
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Returns true if `code` collides with a fixed route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}
