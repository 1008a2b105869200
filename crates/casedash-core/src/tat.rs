//! Turnaround-time (TAT) derivation
//!
//! TAT is the whole number of seconds between a case's parsed and saved
//! timestamps. It is derived per row when rendering and never stored.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder shown for any value that is missing or not applicable
pub const PLACEHOLDER: &str = "-";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp
///
/// Accepts RFC 3339 and RFC 2822 timestamps, naive date-times (interpreted in
/// the local time zone) and bare dates (UTC midnight). Returns `None` for
/// anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) =
        DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw))
    {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Elapsed whole seconds from `parsed` to `saved`
///
/// Returns `None` when either timestamp is missing or unparseable, or when
/// `saved` is earlier than `parsed`.
#[must_use]
pub fn turnaround_seconds(parsed: Option<&str>, saved: Option<&str>) -> Option<i64> {
    let parsed = parse_timestamp(parsed?)?;
    let saved = parse_timestamp(saved?)?;

    let elapsed_ms = saved.signed_duration_since(parsed).num_milliseconds();
    if elapsed_ms < 0 {
        return None;
    }

    Some(elapsed_ms.div_euclid(1000))
}

/// Render TAT as `"<n>s"`, or [`PLACEHOLDER`] when not applicable
#[must_use]
pub fn format_turnaround(parsed: Option<&str>, saved: Option<&str>) -> String {
    turnaround_seconds(parsed, saved)
        .map_or_else(|| PLACEHOLDER.to_string(), |seconds| format!("{seconds}s"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Some("2024-01-01T00:00:00Z"), Some("2024-01-01T00:00:10Z"), "10s")]
    #[case(None, Some("2024-01-01T00:00:00Z"), "-")]
    #[case(Some("2024-01-01T00:00:00Z"), None, "-")]
    #[case(None, None, "-")]
    #[case(Some("2024-01-01T00:00:10Z"), Some("2024-01-01T00:00:00Z"), "-")]
    #[case(Some("not-a-date"), Some("2024-01-01T00:00:00Z"), "-")]
    #[case(Some("2024-01-01T00:00:00Z"), Some("garbage"), "-")]
    #[case(
        Some("Mon, 01 Jan 2024 00:00:00 GMT"),
        Some("Mon, 01 Jan 2024 00:00:10 GMT"),
        "10s"
    )]
    #[case(Some("2024-01-01T00:00:00Z"), Some("Mon, 01 Jan 2024 05:30:07 +0530"), "7s")]
    #[case(Some(""), Some("2024-01-01T00:00:00Z"), "-")]
    #[case(Some("2024-01-01T00:00:00Z"), Some("2024-01-01T00:00:00Z"), "0s")]
    #[case(Some("2024-01-01T00:00:00Z"), Some("2024-01-01T00:00:09.999Z"), "9s")]
    #[case(Some("2024-01-01T00:00:00Z"), Some("2024-01-01T01:00:00Z"), "3600s")]
    #[case(Some("2024-01-01T05:30:00+05:30"), Some("2024-01-01T00:00:30Z"), "30s")]
    fn test_format_turnaround(
        #[case] parsed: Option<&str>,
        #[case] saved: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(format_turnaround(parsed, saved), expected);
    }

    #[test]
    fn test_sub_second_negative_is_rejected() {
        assert_eq!(
            turnaround_seconds(
                Some("2024-01-01T00:00:00.500Z"),
                Some("2024-01-01T00:00:00.000Z")
            ),
            None
        );
    }

    #[test]
    fn test_naive_timestamps_share_a_zone() {
        assert_eq!(
            turnaround_seconds(Some("2024-03-05 10:00:00"), Some("2024-03-05T10:02:05.250")),
            Some(125)
        );
    }

    #[test]
    fn test_date_only_timestamps() {
        assert_eq!(
            turnaround_seconds(Some("2024-01-01"), Some("2024-01-02")),
            Some(86_400)
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_noise() {
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("2024-13-45T99:00:00Z").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
