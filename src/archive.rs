//! The cumulative, newest-first history of published weeks.
//!
//! The archive is a time-ordered log, not an index: merging never deduplicates,
//! so a source visited again after the rotation wraps may legitimately bring
//! back articles that an older week already lists.

use crate::models::WeekEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Archive {
    weeks: Vec<WeekEntry>,
}

impl Archive {
    #[cfg(test)]
    pub fn new(weeks: Vec<WeekEntry>) -> Self {
        Self { weeks }
    }

    /// Prepend this run's week. Existing entries are left untouched and in order.
    pub fn merge(mut self, week: WeekEntry) -> Self {
        self.weeks.insert(0, week);
        self
    }

    /// Weeks, newest first.
    pub fn weeks(&self) -> &[WeekEntry] {
        &self.weeks
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    /// Sum of articles across every week.
    pub fn article_count(&self) -> usize {
        self.weeks.iter().map(|w| w.articles.len()).sum()
    }
}
