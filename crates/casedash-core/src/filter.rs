//! Client-side filter engine
//!
//! Three independent predicates combined with AND. An unset predicate matches
//! every case. Free text is case-insensitive; hospital group and TPA are
//! exact, case-sensitive matches.

use crate::types::CaseRecord;
use serde::{Deserialize, Serialize};

/// Current filter selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free-text query over patient name, AL number and policy number
    #[serde(default)]
    pub search_text: String,

    /// Selected hospital group
    #[serde(default)]
    pub hospital_group: Option<String>,

    /// Selected TPA
    #[serde(default)]
    pub tpa: Option<String>,
}

impl FilterCriteria {
    /// Criteria with every predicate unset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text query
    #[must_use]
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Select a hospital group
    #[must_use]
    pub fn with_hospital_group(mut self, group: impl Into<String>) -> Self {
        self.hospital_group = Some(group.into());
        self
    }

    /// Select a TPA
    #[must_use]
    pub fn with_tpa(mut self, tpa: impl Into<String>) -> Self {
        self.tpa = Some(tpa.into());
        self
    }

    /// Whether the free-text predicate applies
    #[must_use]
    pub fn has_search_text(&self) -> bool {
        !self.search_text.trim().is_empty()
    }

    /// Whether any predicate applies
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.has_search_text() || self.hospital_group().is_some() || self.tpa().is_some()
    }

    /// Selected hospital group, treating the empty string as unset
    #[must_use]
    pub fn hospital_group(&self) -> Option<&str> {
        self.hospital_group.as_deref().filter(|g| !g.is_empty())
    }

    /// Selected TPA, treating the empty string as unset
    #[must_use]
    pub fn tpa(&self) -> Option<&str> {
        self.tpa.as_deref().filter(|t| !t.is_empty())
    }

    /// Test a single case against every active predicate
    #[must_use]
    pub fn matches(&self, case: &CaseRecord) -> bool {
        self.matcher().matches(case)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            query: self
                .has_search_text()
                .then(|| self.search_text.to_lowercase()),
            hospital_group: self.hospital_group(),
            tpa: self.tpa(),
        }
    }
}

/// Criteria prepared for a scan, with the query lowercased once
struct Matcher<'a> {
    query: Option<String>,
    hospital_group: Option<&'a str>,
    tpa: Option<&'a str>,
}

impl Matcher<'_> {
    fn matches(&self, case: &CaseRecord) -> bool {
        if let Some(query) = &self.query {
            let hit = [
                case.patient_name.as_str(),
                case.al_number_or_empty(),
                case.policy_number_or_empty(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(query.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(group) = self.hospital_group
            && case.hospital_group != group
        {
            return false;
        }

        if let Some(tpa) = self.tpa
            && case.tpa_name != tpa
        {
            return false;
        }

        true
    }
}

/// Derive the displayed subset of `cases`, preserving order
#[must_use]
pub fn filter_cases(cases: &[CaseRecord], criteria: &FilterCriteria) -> Vec<CaseRecord> {
    if !criteria.is_active() {
        return cases.to_vec();
    }

    let matcher = criteria.matcher();
    cases
        .iter()
        .filter(|case| matcher.matches(case))
        .cloned()
        .collect()
}

/// Describe the active criteria and the number of results
///
/// Returns `None` when no criterion is active.
#[must_use]
pub fn summarize(criteria: &FilterCriteria, result_count: usize) -> Option<String> {
    let mut parts = Vec::with_capacity(3);

    if criteria.has_search_text() {
        parts.push(format!("Keyword: \"{}\"", criteria.search_text));
    }
    if let Some(group) = criteria.hospital_group() {
        parts.push(format!("Hospital Group: {group}"));
    }
    if let Some(tpa) = criteria.tpa() {
        parts.push(format!("TPA: {tpa}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(format!(
        "Showing results for {} \u{2014} {result_count} result(s) found",
        parts.join(" \u{2022} ")
    ))
}
