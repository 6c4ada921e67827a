//! Which source the digest processed last, and which one comes next.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Persisted rotation record.
///
/// `last_index` is `-1` before the first successful run. The record only
/// moves forward when a run publishes at least one article, so a run that
/// finds nothing retries the same source next time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RotationState {
    pub last_index: i64,
    #[serde(default)]
    pub last_run: Option<DateTime<FixedOffset>>,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            last_index: -1,
            last_run: None,
        }
    }
}

impl RotationState {
    /// Index of the source to process now: `(last_index + 1) mod len`.
    ///
    /// Uses Euclidean modulo so a hand-edited or stale index still lands in
    /// range after the source list shrinks.
    pub fn next_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.last_index.saturating_add(1)).rem_euclid(len as i64) as usize
    }

    /// Record to persist once `index` has been published at `now`.
    pub fn advance(index: usize, now: DateTime<FixedOffset>) -> Self {
        Self {
            last_index: index as i64,
            last_run: Some(now),
        }
    }
}
