//! Dashboard view model
//!
//! Holds everything one mounted dashboard shows: the last loaded snapshot,
//! the filter selection, the derived option sets, the filtered rows and the
//! result summary. Option sets are always recomputed from their inputs rather
//! than edited in place.

use crate::filter::{FilterCriteria, filter_cases, summarize};
use crate::options;
use crate::types::{CaseRecord, DashboardCounts, DashboardSnapshot};

/// State of one dashboard view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    counts: DashboardCounts,
    cases: Vec<CaseRecord>,
    filtered: Vec<CaseRecord>,
    hospital_groups: Vec<String>,
    tpa_options: Vec<String>,
    criteria: FilterCriteria,
    summary: Option<String>,
}

impl DashboardView {
    /// Create an empty view
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all loaded data with `snapshot`
    ///
    /// Filter criteria survive the replacement. With `reapply_filters` the
    /// criteria are re-run over the fresh list; otherwise the full list is
    /// shown and the summary hidden until filters are applied again.
    pub fn apply_snapshot(&mut self, snapshot: DashboardSnapshot, reapply_filters: bool) {
        let DashboardSnapshot { counts, cases } = snapshot;

        self.counts = counts;
        self.cases = cases;
        self.hospital_groups = options::hospital_groups(&self.cases);
        self.refresh_tpa_options();

        if let Some(tpa) = self.criteria.tpa()
            && !self.tpa_options.iter().any(|option| option == tpa)
        {
            self.criteria.tpa = None;
        }

        if reapply_filters {
            self.apply_filters();
        } else {
            self.filtered = self.cases.clone();
            self.summary = None;
        }
    }

    /// Update the free-text query without applying it
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.criteria.search_text = text.into();
    }

    /// Select a hospital group, or clear the selection with `None`
    ///
    /// The TPA options are narrowed to the group and the TPA selection is
    /// cleared, since it may no longer be offered.
    pub fn select_hospital_group(&mut self, group: Option<String>) {
        self.criteria.hospital_group = group.filter(|g| !g.is_empty());
        self.criteria.tpa = None;
        self.refresh_tpa_options();
    }

    /// Select a TPA, or clear the selection with `None`
    pub fn select_tpa(&mut self, tpa: Option<String>) {
        self.criteria.tpa = tpa.filter(|t| !t.is_empty());
    }

    /// Run the current criteria over the loaded cases
    ///
    /// Returns the number of matching cases.
    pub fn apply_filters(&mut self) -> usize {
        self.filtered = filter_cases(&self.cases, &self.criteria);
        self.summary = summarize(&self.criteria, self.filtered.len());
        self.filtered.len()
    }

    /// Clear every criterion and show the full list again
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refresh_tpa_options();
        self.filtered = self.cases.clone();
        self.summary = None;
    }

    /// Aggregate counts from the last load
    #[must_use]
    pub const fn counts(&self) -> DashboardCounts {
        self.counts
    }

    /// Parsed plus saved from the last load
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.counts.total()
    }

    /// Every case from the last load
    #[must_use]
    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    /// Cases currently displayed
    #[must_use]
    pub fn filtered(&self) -> &[CaseRecord] {
        &self.filtered
    }

    /// Hospital-group options
    #[must_use]
    pub fn hospital_groups(&self) -> &[String] {
        &self.hospital_groups
    }

    /// TPA options for the current hospital-group selection
    #[must_use]
    pub fn tpa_options(&self) -> &[String] {
        &self.tpa_options
    }

    /// Current filter selection
    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Result summary, present only after applying active criteria
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn refresh_tpa_options(&mut self) {
        self.tpa_options = options::tpa_options(&self.cases, self.criteria.hospital_group());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaseId;
    use pretty_assertions::assert_eq;

    fn case(id: i64, name: &str, group: &str, tpa: &str) -> CaseRecord {
        CaseRecord {
            id: CaseId::Number(id),
            patient_name: name.to_string(),
            al_number: None,
            policy_number: None,
            hospital_group: group.to_string(),
            tpa_name: tpa.to_string(),
            parsed_time: Some("2024-01-01T00:00:00Z".to_string()),
            saved_time: Some("2024-01-01T00:00:10Z".to_string()),
            status: "Saved".to_string(),
        }
    }

    fn scenario() -> DashboardSnapshot {
        DashboardSnapshot::new(
            DashboardCounts::new(5, 3),
            vec![
                case(1, "Ravi", "Apollo", "Vidal"),
                case(2, "Meena", "Fortis", "Paramount"),
            ],
        )
    }

    fn loaded() -> DashboardView {
        let mut view = DashboardView::new();
        view.apply_snapshot(scenario(), false);
        view
    }

    #[test]
    fn test_apply_snapshot_replaces_everything() {
        let view = loaded();

        assert_eq!(view.total(), 8);
        assert_eq!(view.counts(), DashboardCounts::new(5, 3));
        assert_eq!(view.cases().len(), 2);
        assert_eq!(view.filtered(), view.cases());
        assert_eq!(view.hospital_groups(), ["Apollo", "Fortis"]);
        assert_eq!(view.tpa_options(), ["Vidal", "Paramount"]);
        assert!(view.summary().is_none());
    }

    #[test]
    fn test_selecting_group_narrows_tpas() {
        let mut view = loaded();

        view.select_hospital_group(Some("Apollo".to_string()));

        assert_eq!(view.tpa_options(), ["Vidal"]);
        assert_eq!(view.total(), 8);
    }

    #[test]
    fn test_selecting_group_clears_tpa() {
        let mut view = loaded();
        view.select_tpa(Some("Paramount".to_string()));

        view.select_hospital_group(Some("Apollo".to_string()));

        assert!(view.criteria().tpa.is_none());
    }

    #[test]
    fn test_clearing_group_restores_all_tpas() {
        let mut view = loaded();
        view.select_hospital_group(Some("Fortis".to_string()));

        view.select_hospital_group(None);

        assert_eq!(view.tpa_options(), ["Vidal", "Paramount"]);
    }

    #[test]
    fn test_filters_are_not_applied_until_requested() {
        let mut view = loaded();
        view.set_search_text("meena");

        assert_eq!(view.filtered().len(), 2);
        assert_eq!(view.apply_filters(), 1);
        assert_eq!(view.filtered()[0].patient_name, "Meena");
        assert_eq!(
            view.summary(),
            Some("Showing results for Keyword: \"meena\" \u{2014} 1 result(s) found")
        );
    }

    #[test]
    fn test_reset_restores_full_list() {
        let mut view = loaded();
        view.set_search_text("ravi");
        view.select_hospital_group(Some("Apollo".to_string()));
        view.select_tpa(Some("Vidal".to_string()));
        view.apply_filters();

        view.reset_filters();

        assert_eq!(view.filtered(), view.cases());
        assert!(view.summary().is_none());
        assert_eq!(view.criteria(), &FilterCriteria::default());
        assert_eq!(view.tpa_options(), ["Vidal", "Paramount"]);
    }

    #[test]
    fn test_apply_without_criteria_hides_summary() {
        let mut view = loaded();

        assert_eq!(view.apply_filters(), 2);
        assert!(view.summary().is_none());
    }

    #[test]
    fn test_reload_keeps_criteria_but_shows_full_list() {
        let mut view = loaded();
        view.select_hospital_group(Some("Apollo".to_string()));
        view.apply_filters();
        assert_eq!(view.filtered().len(), 1);

        view.apply_snapshot(scenario(), false);

        assert_eq!(view.criteria().hospital_group.as_deref(), Some("Apollo"));
        assert_eq!(view.tpa_options(), ["Vidal"]);
        assert_eq!(view.filtered().len(), 2);
        assert!(view.summary().is_none());
    }

    #[test]
    fn test_reload_can_reapply_filters() {
        let mut view = loaded();
        view.select_hospital_group(Some("Fortis".to_string()));
        view.apply_filters();

        let mut next = scenario();
        next.cases.push(case(3, "Kiran", "Fortis", "Vidal"));
        view.apply_snapshot(next, true);

        assert_eq!(view.filtered().len(), 2);
        assert_eq!(
            view.summary(),
            Some("Showing results for Hospital Group: Fortis \u{2014} 2 result(s) found")
        );
    }

    #[test]
    fn test_reload_drops_tpa_no_longer_offered() {
        let mut view = loaded();
        view.select_tpa(Some("Paramount".to_string()));

        view.apply_snapshot(
            DashboardSnapshot::new(
                DashboardCounts::new(1, 0),
                vec![case(1, "Ravi", "Apollo", "Vidal")],
            ),
            false,
        );

        assert!(view.criteria().tpa.is_none());
    }

    #[test]
    fn test_reload_keeps_tpa_still_offered() {
        let mut view = loaded();
        view.select_tpa(Some("Vidal".to_string()));

        view.apply_snapshot(scenario(), false);

        assert_eq!(view.criteria().tpa.as_deref(), Some("Vidal"));
    }
}
