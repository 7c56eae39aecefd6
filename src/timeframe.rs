use chrono::{Duration, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeframeError {
    #[error("invalid date '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("start date {start} is not before end date {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
}

/// A closed calendar-date range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeframe {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Timeframe {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimeframeError> {
        if start >= end {
            return Err(TimeframeError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a pair of `YYYY-MM-DD` strings into a timeframe.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeframeError> {
        let parse_one = |input: &str| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|source| TimeframeError::Parse {
                input: input.to_string(),
                source,
            })
        };
        Self::new(parse_one(start)?, parse_one(end)?)
    }

    /// Midpoint of the range: `start + (end - start) / 2`, with the day
    /// count halved by integer division. For an odd number of days the
    /// midpoint lands on the earlier of the two central dates, so
    /// 2020-01-01..2020-01-10 yields 2020-01-05.
    pub fn midpoint(&self) -> NaiveDate {
        let half = (self.end - self.start).num_days() / 2;
        self.start + Duration::days(half)
    }

    /// Split into two sub-timeframes `[start, mid]` and `[mid, end]` that
    /// share the midpoint as their boundary date. Both halves span at least
    /// one day because `start < end` guarantees `num_days() >= 1`.
    pub fn split(&self) -> (Timeframe, Timeframe) {
        let mid = self.midpoint();
        // A one-day range has mid == start; pin the boundary inside the
        // range so both halves stay non-empty.
        let mid = if mid == self.start {
            self.start + Duration::days(1)
        } else {
            mid
        };
        (
            Timeframe {
                start: self.start,
                end: mid,
            },
            Timeframe {
                start: mid,
                end: self.end,
            },
        )
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}
