//! Business-timezone helpers
//!
//! Storage works in UTC Unix millis; "same day" and "shift start" questions
//! are answered in the configured business timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Formats accepted for clock corrections, tried in order
const LOCAL_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Local calendar date of a millis timestamp
pub fn local_date(millis: i64, tz: Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz).date_naive())
}

/// Whether two timestamps fall on the same local calendar day
pub fn same_local_day(a: i64, b: i64, tz: Tz) -> bool {
    match (local_date(a, tz), local_date(b, tz)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Local date + time → Unix millis
///
/// DST gap fallback: a local time that does not exist is read as UTC.
pub fn local_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    naive_to_millis(date.and_time(time), tz)
}

fn naive_to_millis(naive: NaiveDateTime, tz: Tz) -> i64 {
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Parse a submitted clock time. `None` for anything unparseable.
pub fn parse_clock_time(value: &str, tz: Tz) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive_to_millis(naive, tz))
}

/// Whole years between `dob` and `today`
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    use chrono::Datelike;
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Today in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    tz.from_utc_datetime(&chrono::Utc::now().naive_utc()).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kolkata() -> Tz {
        "Asia/Kolkata".parse().unwrap()
    }

    #[test]
    fn test_same_local_day_respects_timezone() {
        let tz = kolkata();
        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let morning = local_to_millis(d, NaiveTime::from_hms_opt(0, 30, 0).unwrap(), tz);
        let evening = local_to_millis(d, NaiveTime::from_hms_opt(23, 30, 0).unwrap(), tz);
        // 00:30 IST is still the previous day in UTC
        assert!(same_local_day(morning, evening, tz));
        assert!(!same_local_day(morning, evening, chrono_tz::UTC));
    }

    #[test]
    fn test_parse_clock_time_formats() {
        let tz = chrono_tz::UTC;
        let expected = local_to_millis(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            tz,
        );
        assert_eq!(parse_clock_time("2024-05-01T09:15", tz), Some(expected));
        assert_eq!(parse_clock_time("2024-05-01 09:15:00", tz), Some(expected));
        assert_eq!(parse_clock_time("2024-05-01T09:15:00Z", tz), Some(expected));
        assert_eq!(parse_clock_time("yesterday-ish", tz), None);
        assert_eq!(parse_clock_time("  ", tz), None);
    }

    #[test]
    fn test_age_on() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), 19);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), 20);
    }
}
