//! Per-author, time-bucketed line counts.
//!
//! Counting is pure and order-independent: folding records one at a time
//! and merging independently built partial reports produce the same
//! result, which is what makes per-file parallelism safe.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::blame::BlameLineRecord;

/// Author name git blame assigns to lines not yet committed.
pub const UNCOMMITTED: &str = "Not Committed Yet";

/// Line counts for one author, bucketed three ways from the same
/// timestamps.
///
/// Invariant: `all_lines` equals the sum of `by_year`, of `by_month`, and
/// of `by_day`; all four counters move together for every accepted line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub all_lines: u64,
    pub by_year: BTreeMap<i32, u64>,
    /// Keys are `YYYY-MM`.
    pub by_month: BTreeMap<String, u64>,
    /// Keys are `YYYY-MM-DD`.
    pub by_day: BTreeMap<String, u64>,
}

impl AuthorStats {
    /// Count one line at `timestamp`, keeping all four counters in step.
    fn record(&mut self, timestamp: NaiveDateTime) {
        let date = timestamp.date();
        self.all_lines += 1;
        *self.by_year.entry(date.year()).or_insert(0) += 1;
        *self
            .by_month
            .entry(date.format("%Y-%m").to_string())
            .or_insert(0) += 1;
        *self
            .by_day
            .entry(date.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
    }

    fn merge(&mut self, other: AuthorStats) {
        self.all_lines += other.all_lines;
        for (year, count) in other.by_year {
            *self.by_year.entry(year).or_insert(0) += count;
        }
        for (month, count) in other.by_month {
            *self.by_month.entry(month).or_insert(0) += count;
        }
        for (day, count) in other.by_day {
            *self.by_day.entry(day).or_insert(0) += count;
        }
    }
}

/// Authorship statistics for a whole tree, keyed by author name (which
/// includes the [`UNCOMMITTED`] sentinel when the working tree carries
/// unstaged lines). Serializes as a plain author → stats mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisReport {
    authors: BTreeMap<String, AuthorStats>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one blame record into the report.
    pub fn accumulate(&mut self, record: &BlameLineRecord) {
        self.authors
            .entry(record.author.clone())
            .or_default()
            .record(record.timestamp);
    }

    /// Sum another report into this one. Merge is commutative and
    /// associative, so partial reports combine in any fan-in order.
    pub fn merge(&mut self, other: AnalysisReport) {
        for (author, stats) in other.authors {
            self.authors.entry(author).or_default().merge(stats);
        }
    }

    pub fn authors(&self) -> &BTreeMap<String, AuthorStats> {
        &self.authors
    }

    pub fn total_lines(&self) -> u64 {
        self.authors.values().map(|s| s.all_lines).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}
