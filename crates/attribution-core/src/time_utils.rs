use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::models::CalendarFields;

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Naive date-time patterns tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a touchpoint timestamp into a wall-clock [`NaiveDateTime`].
///
/// Accepts:
/// * RFC 3339 / ISO 8601 with an offset or `Z` suffix. The offset is kept as
///   local wall-clock time, it is not converted to UTC.
/// * `YYYY-MM-DD HH:MM[:SS[.f]]`, with either a space or a `T` separator.
/// * date-only `YYYY-MM-DD` (midnight).
///
/// Returns `None` for empty strings or anything else.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

// ── Calendar fields ───────────────────────────────────────────────────────────

/// Extract year, month, day, hour and weekday from a parsed timestamp.
pub fn calendar_fields(ts: &NaiveDateTime) -> CalendarFields {
    CalendarFields {
        year: ts.year(),
        month: ts.month(),
        day: ts.day(),
        hour: ts.hour(),
        weekday: ts.weekday(),
    }
}

/// Full English weekday name, independent of the host locale.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_space_separated() {
        assert_eq!(
            parse_timestamp("2019-12-22 15:40:20"),
            Some(dt(2019, 12, 22, 15, 40, 20))
        );
    }

    #[test]
    fn test_parse_t_separated_without_seconds() {
        assert_eq!(
            parse_timestamp("2020-01-01T10:00"),
            Some(dt(2020, 1, 1, 10, 0, 0))
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_timestamp("2020-01-01 10:00:00.250").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        assert_eq!(
            parse_timestamp("2020-01-01T23:30:00+02:00"),
            Some(dt(2020, 1, 1, 23, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2020-01-01T23:30:00Z"),
            Some(dt(2020, 1, 1, 23, 30, 0))
        );
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_timestamp("2020-02-29"), Some(dt(2020, 2, 29, 0, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2020-13-01 10:00:00"), None);
        assert_eq!(parse_timestamp("2019-02-29"), None);
    }

    #[test]
    fn test_calendar_fields() {
        // 2020-01-06 was a Monday.
        let fields = calendar_fields(&dt(2020, 1, 6, 23, 59, 0));
        assert_eq!(fields.year, 2020);
        assert_eq!(fields.month, 1);
        assert_eq!(fields.day, 6);
        assert_eq!(fields.hour, 23);
        assert_eq!(fields.weekday, Weekday::Mon);
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_name(Weekday::Mon), "Monday");
        assert_eq!(weekday_name(Weekday::Wed), "Wednesday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }
}
