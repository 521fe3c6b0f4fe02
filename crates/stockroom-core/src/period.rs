//! # Report Periods
//!
//! Time boundaries used by the analytics layer.
//!
//! ```text
//!            month_start          week_start      today_start      now
//!                 │                    │               │            │
//!  ──────────────●────────────────────●───────────────●────────────●──►
//!           1st 00:00 UTC       Monday 00:00 UTC   00:00 UTC
//! ```
//!
//! Optional report bounds arrive as loosely formatted strings. Anything that
//! does not parse is treated as absent.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

// =============================================================================
// Report Periods
// =============================================================================

/// Start instants of the current day, ISO week and calendar month (all UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriods {
    pub today_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl ReportPeriods {
    /// Computes the period boundaries that contain `now`.
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use stockroom_core::ReportPeriods;
    ///
    /// // Thursday 2024-03-14 15:30 UTC
    /// let now = Utc.with_ymd_and_hms(2024, 3, 14, 15, 30, 0).unwrap();
    /// let p = ReportPeriods::starting(now);
    /// assert_eq!(p.today_start, Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap());
    /// assert_eq!(p.week_start, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    /// assert_eq!(p.month_start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    /// ```
    pub fn starting(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let first = today.with_day(1).unwrap_or(today);

        ReportPeriods {
            today_start: midnight(today),
            week_start: midnight(monday),
            month_start: midnight(first),
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive `created_at` bounds for a report. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Builds a range from raw query parameters. Unparseable values become
    /// open bounds.
    pub fn parse_lenient(start: Option<&str>, end: Option<&str>) -> Self {
        DateRange {
            start: start.and_then(parse_timestamp),
            end: end.and_then(parse_timestamp),
        }
    }
}

/// Parses a timestamp in any of the accepted shapes:
///
/// - RFC 3339 (`2024-03-14T10:00:00Z`, `2024-03-14T10:00:00+02:00`)
/// - naive date-time, taken as UTC (`2024-03-14T10:00:00`, `2024-03-14 10:00:00.250`)
/// - bare date, midnight UTC (`2024-03-14`)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(midnight)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_week_starts_on_monday() {
        // Monday itself
        let p = ReportPeriods::starting(utc(2024, 3, 11, 0, 0, 1));
        assert_eq!(p.week_start, utc(2024, 3, 11, 0, 0, 0));

        // Sunday belongs to the week that began six days earlier
        let p = ReportPeriods::starting(utc(2024, 3, 17, 23, 59, 59));
        assert_eq!(p.week_start, utc(2024, 3, 11, 0, 0, 0));
    }

    #[test]
    fn test_week_can_start_in_previous_month() {
        // Friday 2024-03-01, week began Monday 2024-02-26
        let p = ReportPeriods::starting(utc(2024, 3, 1, 12, 0, 0));
        assert_eq!(p.week_start, utc(2024, 2, 26, 0, 0, 0));
        assert_eq!(p.month_start, utc(2024, 3, 1, 0, 0, 0));
        assert_eq!(p.today_start, utc(2024, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_parse_accepted_shapes() {
        let expected = utc(2024, 3, 14, 10, 0, 0);
        assert_eq!(parse_timestamp("2024-03-14T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-14T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-14T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-14 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-14T10:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-14"),
            Some(utc(2024, 3, 14, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "yesterday", "2024-13-01", "14/03/2024", "2024-03-14T25:00:00"] {
            assert_eq!(parse_timestamp(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_lenient_range_drops_bad_bounds() {
        let range = DateRange::parse_lenient(Some("not-a-date"), Some("2024-03-14"));
        assert_eq!(range.start, None);
        assert_eq!(range.end, Some(utc(2024, 3, 14, 0, 0, 0)));
    }
}
