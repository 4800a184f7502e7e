//! Calendar-day ranges and the news feed's published-date format.

use crate::errors::{CollectError, Rejection};
use chrono::{NaiveDate, NaiveDateTime, Weekday};

/// Published dates arrive as `Thu, 01 Jun 2023 12:00:00 GMT`. The leading
/// weekday and the trailing zone abbreviation are split off before parsing.
const FEED_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// A half-open range of calendar days, `[start, end)`.
///
/// The range is validated once at construction and can be iterated any
/// number of times; each call to [`DateRange::days`] starts from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range from `start` (inclusive) to `end` (exclusive).
    ///
    /// An equal pair is an empty range. An inverted pair is a configuration
    /// error and is surfaced rather than silently yielding nothing.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CollectError> {
        if end < start {
            return Err(CollectError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Lazily yield every day in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day < end)
    }
}

/// Parse the feed's published-date string into the calendar day it names.
///
/// The date is taken as written; the zone abbreviation is required but not
/// used for conversion. The leading weekday must name a weekday but is not
/// checked against the date.
pub fn parse_published_date(raw: &str) -> Result<NaiveDate, Rejection> {
    let raw = raw.trim();
    let unrecognised = || Rejection::Malformed(format!("unrecognised published date {raw:?}"));
    let (weekday, rest) = raw.split_once(", ").ok_or_else(unrecognised)?;
    weekday.parse::<Weekday>().map_err(|_| unrecognised())?;
    let (stamp, zone) = rest.rsplit_once(' ').ok_or_else(unrecognised)?;

    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Rejection::Malformed(format!(
            "missing timezone in published date {raw:?}"
        )));
    }

    NaiveDateTime::parse_from_str(stamp.trim(), FEED_DATE_FORMAT)
        .map(|dt| dt.date())
        .map_err(|e| Rejection::Malformed(format!("unparseable published date {raw:?}: {e}")))
}
