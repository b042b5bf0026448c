//! Converts a canonical timezone name into a UTC offset.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, timezones};

use crate::Error;

/// Get the UTC offset that is currently in effect for the canonical timezone
/// `timezone`, e.g. "Pacific/Auckland".
///
/// The offset is evaluated against the current instant so that daylight
/// saving is accounted for.
///
/// # Errors
///
/// Returns [Error::InvalidTimezoneError] if `timezone` is not a known
/// canonical timezone name.
pub fn get_local_offset(timezone: &str) -> Result<UtcOffset, Error> {
    let timezone = timezones::get_by_name(timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(timezone.to_owned()))?;

    Ok(timezone.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}
