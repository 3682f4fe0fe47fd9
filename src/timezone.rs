//! Resolves the configured timezone used to normalize imported dates of sale.

use time_tz::Tz;

use crate::Error;

/// Look up a canonical timezone by name, e.g. "Pacific/Auckland".
///
/// Returns `None` if `canonical_timezone` is not a known timezone.
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// Like [get_timezone], but reports unknown timezones as an error.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
pub(crate) fn require_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    get_timezone(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::datetime};
    use time_tz::{Offset, TimeZone};

    use crate::Error;

    use super::{get_timezone, require_timezone};

    #[test]
    fn resolves_utc() {
        let tz = get_timezone("Etc/UTC").expect("Etc/UTC should be a known timezone");

        assert_eq!(
            tz.get_offset_utc(&datetime!(2022-03-01 00:00 UTC)).to_utc(),
            UtcOffset::UTC
        );
    }

    #[test]
    fn offset_depends_on_the_instant() {
        let tz = require_timezone("America/New_York").unwrap();

        let winter = tz.get_offset_utc(&datetime!(2022-01-15 12:00 UTC)).to_utc();
        let summer = tz.get_offset_utc(&datetime!(2022-07-15 12:00 UTC)).to_utc();

        assert_eq!(winter, UtcOffset::from_hms(-5, 0, 0).unwrap());
        assert_eq!(summer, UtcOffset::from_hms(-4, 0, 0).unwrap());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(get_timezone("Mars/Olympus_Mons").is_none());
        assert!(matches!(
            require_timezone("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezone(ref name)) if name == "Mars/Olympus_Mons"
        ));
    }
}
