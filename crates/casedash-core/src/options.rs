//! Option sets for the hospital-group and TPA selectors
//!
//! Both are de-duplicated in first-seen order, so the selectors list values in
//! the order the backend returned them. Blank values are never offered.

use crate::types::CaseRecord;
use indexmap::IndexSet;

/// Distinct hospital groups across `cases`
#[must_use]
pub fn hospital_groups(cases: &[CaseRecord]) -> Vec<String> {
    distinct(cases.iter().map(|c| c.hospital_group.as_str()))
}

/// Distinct TPA names offered for the given hospital group selection
///
/// With no group selected every TPA is offered; otherwise only TPAs that
/// appear among that group's cases.
#[must_use]
pub fn tpa_options(cases: &[CaseRecord], hospital_group: Option<&str>) -> Vec<String> {
    match hospital_group {
        None => distinct(cases.iter().map(|c| c.tpa_name.as_str())),
        Some(group) => distinct(
            cases
                .iter()
                .filter(|c| c.hospital_group == group)
                .map(|c| c.tpa_name.as_str()),
        ),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.trim().is_empty())
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
