//! Sliding-window rate limiting types.

use chrono::{DateTime, Utc};

/// A timestamped marker in a client's time-ordered window set.
///
/// `member` must be unique per call so that simultaneous requests scored at
/// the same millisecond are not collapsed into a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateWindowEntry {
    pub member: String,
    pub score_ms: i64,
}

impl RateWindowEntry {
    /// Creates an entry scored at `now` with a random member suffix.
    pub fn at(now: DateTime<Utc>) -> Self {
        let score_ms = now.timestamp_millis();
        Self {
            member: format!("{}-{:016x}", score_ms, rand::random::<u64>()),
            score_ms,
        }
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_at_same_instant_have_distinct_members() {
        let now = Utc::now();
        let a = RateWindowEntry::at(now);
        let b = RateWindowEntry::at(now);

        assert_eq!(a.score_ms, b.score_ms);
        assert_ne!(a.member, b.member);
        assert!(a.member.starts_with(&now.timestamp_millis().to_string()));
    }
}
