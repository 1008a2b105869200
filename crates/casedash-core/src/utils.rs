//! Display helpers shared by every renderer

use crate::tat::{PLACEHOLDER, format_turnaround, parse_timestamp};
use crate::types::CaseRecord;
use chrono::Local;
use serde::Serialize;

/// Local date-time layout used for timestamps
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// The value itself, or [`PLACEHOLDER`] when absent or empty
#[must_use]
pub fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER)
}

/// Render a backend timestamp in the local time zone
///
/// Missing values render as [`PLACEHOLDER`]; text that is not a timestamp is
/// shown as-is.
#[must_use]
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw.filter(|r| !r.is_empty()) {
        None => PLACEHOLDER.to_string(),
        Some(raw) => parse_timestamp(raw).map_or_else(
            || raw.to_string(),
            |ts| ts.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        ),
    }
}

/// One table row, rendered to display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRow {
    /// Patient name
    pub patient_name: String,
    /// AL number or placeholder
    pub al_number: String,
    /// Policy number or placeholder
    pub policy_number: String,
    /// Hospital group
    pub hospital_group: String,
    /// TPA name
    pub tpa_name: String,
    /// Local parsed time or placeholder
    pub parsed_time: String,
    /// Local saved time or placeholder
    pub saved_time: String,
    /// Turnaround time or placeholder
    pub tat: String,
    /// Status as sent
    pub status: String,
    /// Lowercase status class
    pub status_class: String,
}

impl From<&CaseRecord> for CaseRow {
    fn from(case: &CaseRecord) -> Self {
        Self {
            patient_name: case.patient_name.clone(),
            al_number: or_placeholder(case.al_number.as_deref()).to_string(),
            policy_number: or_placeholder(case.policy_number.as_deref()).to_string(),
            hospital_group: case.hospital_group.clone(),
            tpa_name: case.tpa_name.clone(),
            parsed_time: format_timestamp(case.parsed_time.as_deref()),
            saved_time: format_timestamp(case.saved_time.as_deref()),
            tat: format_turnaround(case.parsed_time.as_deref(), case.saved_time.as_deref()),
            status: case.status.clone(),
            status_class: case.status_class(),
        }
    }
}

/// Table column headings, in display order
pub const COLUMN_HEADINGS: [&str; 9] = [
    "Patient Name",
    "AL Number",
    "Policy No",
    "Hospital Group",
    "TPA",
    "Parsed Time",
    "Saved Time",
    "TAT",
    "Status",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaseId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(Some("AL-1")), "AL-1");
        assert_eq!(or_placeholder(Some("")), "-");
        assert_eq!(or_placeholder(None), "-");
    }

    #[test]
    fn test_format_timestamp_placeholder_and_raw() {
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_timestamp(Some("")), "-");
        assert_eq!(format_timestamp(Some("soon")), "soon");
    }

    #[test]
    fn test_format_timestamp_uses_local_zone() {
        let expected = parse_timestamp("2024-01-01T00:00:10Z")
            .map(|ts| ts.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string());

        assert_eq!(
            Some(format_timestamp(Some("2024-01-01T00:00:10Z"))),
            expected
        );
    }

    #[test]
    fn test_case_row_rendering() {
        let case = CaseRecord {
            id: CaseId::Number(9),
            patient_name: "Ravi".to_string(),
            al_number: None,
            policy_number: Some("POL-9".to_string()),
            hospital_group: "Apollo".to_string(),
            tpa_name: "Vidal".to_string(),
            parsed_time: Some("2024-01-01T00:00:00Z".to_string()),
            saved_time: None,
            status: "PARSED".to_string(),
        };

        let row = CaseRow::from(&case);

        assert_eq!(row.al_number, "-");
        assert_eq!(row.policy_number, "POL-9");
        assert_eq!(row.saved_time, "-");
        assert_eq!(row.tat, "-");
        assert_eq!(row.status, "PARSED");
        assert_eq!(row.status_class, "parsed");
    }
}
