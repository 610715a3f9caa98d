use crate::config::ReportConfig;
use crate::types::FootfallRecord;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// An inverted range (start after end) disables filtering.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Min/max of the parsed entry dates, or `None` when no date parsed.
pub fn data_range(records: &[FootfallRecord]) -> Option<DateRange> {
    let mut dates = records.iter().filter_map(|r| r.entry_date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange::new(min, max))
}

/// Apply the run's `from`/`to` overrides on top of the data's own range.
/// With no parseable dates at all the default is today.
pub fn resolve_range(records: &[FootfallRecord], config: &ReportConfig) -> DateRange {
    let default = data_range(records).unwrap_or_else(|| DateRange::single(Local::now().date_naive()));
    DateRange::new(
        config.from.unwrap_or(default.start),
        config.to.unwrap_or(default.end),
    )
}

/// Keep records whose entry date falls within `range`.
///
/// Undated records never match a range. An inverted range passes every
/// record through unfiltered.
pub fn filter_by_date(records: &[FootfallRecord], range: &DateRange) -> Vec<FootfallRecord> {
    if range.is_inverted() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.entry_date.is_some_and(|d| range.contains(d)))
        .cloned()
        .collect()
}
