//! Day-number dates as stored in RowBinary `Date` columns.
//!
//! A date is a little-endian `u16` counting whole days since 1970-01-01 UTC.

use time::{Duration, OffsetDateTime};

use crate::{Error, Result};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// UTC midnight of the given day number.
pub fn date_from_days(days: u16) -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH + Duration::days(i64::from(days))
}

/// Whole UTC days between the epoch and `date`.
pub fn days_from_date(date: OffsetDateTime) -> Result<u16> {
    let days = date.unix_timestamp().div_euclid(SECONDS_PER_DAY);
    u16::try_from(days).map_err(|_| Error::DateOutOfRange(days))
}

/// Day number of a unix timestamp, saturating at `u16::MAX`.
pub fn days_from_unix(timestamp: u32) -> u16 {
    let days = i64::from(timestamp) / SECONDS_PER_DAY;
    u16::try_from(days).unwrap_or(u16::MAX)
}
