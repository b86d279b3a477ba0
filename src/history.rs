//! Exchange history queries
//!
//! History is stored oldest first; everything shown to the user is newest
//! first and optionally narrowed to one calendar month.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::model::{HistoryEntry, HistoryKind};

/// Calendar month used to filter history
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing a Unix timestamp (ms), in a zone `offset_minutes` east of UTC
    pub fn of(timestamp: i64, offset_minutes: i32) -> Option<Self> {
        let local = local_time(timestamp, offset_minutes)?;
        Some(Self {
            year: local.year(),
            month: local.month(),
        })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

fn local_time(timestamp: i64, offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_minutes.checked_mul(60)?)?;
    DateTime::from_timestamp_millis(timestamp).map(|t| t.with_timezone(&offset))
}

/// Entries newest first
pub fn newest_first(entries: &[HistoryEntry]) -> impl Iterator<Item = &HistoryEntry> {
    entries.iter().rev()
}

/// Most recent entry (shown as the collapsed preview)
pub fn latest(entries: &[HistoryEntry]) -> Option<&HistoryEntry> {
    entries.last()
}

/// Distinct months that have entries, newest first
pub fn months(entries: &[HistoryEntry], offset_minutes: i32) -> Vec<YearMonth> {
    let mut months: Vec<YearMonth> = entries
        .iter()
        .filter_map(|e| YearMonth::of(e.timestamp, offset_minutes))
        .collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

/// Entries newest first, narrowed to `month` when one is given
pub fn filtered(
    entries: &[HistoryEntry],
    month: Option<YearMonth>,
    offset_minutes: i32,
) -> Vec<&HistoryEntry> {
    newest_first(entries)
        .filter(|e| month.is_none() || YearMonth::of(e.timestamp, offset_minutes) == month)
        .collect()
}

/// One-line description of an entry
pub fn describe(entry: &HistoryEntry, currency: &str) -> String {
    match entry.kind {
        HistoryKind::Exchange => format!("Exchanged {} coins", entry.coins),
        HistoryKind::Reset => format!(
            "Data reset ({} coins, {}{} cleared)",
            entry.coins, entry.reward, currency
        ),
    }
}

/// Format a timestamp as "M/D HH:00" in the given zone
pub fn format_date(timestamp: i64, offset_minutes: i32) -> String {
    match local_time(timestamp, offset_minutes) {
        Some(t) => format!("{}/{} {:02}:00", t.month(), t.day(), t.hour()),
        None => "N/A".to_string(),
    }
}
