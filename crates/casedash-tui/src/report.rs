//! Headless `snapshot` and `watch` commands

use crate::cli::OutputFormat;
use casedash_client::{ApiClient, DashboardSession, DataLoader};
use casedash_core::utils::{COLUMN_HEADINGS, CaseRow};
use casedash_core::{Config, DashboardCounts, DashboardView, Result};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, warn};

/// Filters requested on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFilters {
    /// Free-text search
    pub search: Option<String>,
    /// Hospital group
    pub group: Option<String>,
    /// TPA name
    pub tpa: Option<String>,
}

impl SnapshotFilters {
    /// Apply the filters to `view` the way the interactive view would
    pub fn apply(&self, view: &mut DashboardView) {
        if let Some(search) = &self.search {
            view.set_search_text(search.clone());
        }
        if self.group.is_some() {
            view.select_hospital_group(self.group.clone());
        }
        if self.tpa.is_some() {
            view.select_tpa(self.tpa.clone());
        }
        if view.criteria().is_active() {
            view.apply_filters();
        }
    }
}

#[derive(Serialize)]
struct SnapshotReport<'a> {
    counts: CountsReport,
    summary: Option<&'a str>,
    cases: Vec<CaseRow>,
}

#[derive(Serialize)]
struct CountsReport {
    parsed: u64,
    saved: u64,
    total: u64,
}

impl From<DashboardCounts> for CountsReport {
    fn from(counts: DashboardCounts) -> Self {
        Self {
            parsed: counts.parsed,
            saved: counts.saved,
            total: counts.total(),
        }
    }
}

/// Load once, filter and render
///
/// # Errors
///
/// Returns an error if the load fails.
pub async fn snapshot(
    config: &Config,
    filters: &SnapshotFilters,
    format: OutputFormat,
) -> Result<String> {
    let loader = DataLoader::new(ApiClient::new(config.base_url())?);
    let snapshot = loader.fetch_snapshot().await?;

    let mut view = DashboardView::new();
    view.apply_snapshot(snapshot, false);
    filters.apply(&mut view);

    match format {
        OutputFormat::Table => Ok(render_table(&view)),
        OutputFormat::Json => render_json(&view),
    }
}

/// Render counts, summary and filtered rows as aligned text
#[must_use]
pub fn render_table(view: &DashboardView) -> String {
    let counts = view.counts();
    let mut out = format!(
        "Parsed Cases: {}  Saved Cases: {}  Total Cases: {}\n",
        counts.parsed,
        counts.saved,
        counts.total()
    );
    if let Some(summary) = view.summary() {
        out.push_str(summary);
        out.push('\n');
    }
    out.push('\n');

    let rows: Vec<[String; 9]> = view
        .filtered()
        .iter()
        .map(|case| {
            let row = CaseRow::from(case);
            [
                row.patient_name,
                row.al_number,
                row.policy_number,
                row.hospital_group,
                row.tpa_name,
                row.parsed_time,
                row.saved_time,
                row.tat,
                row.status,
            ]
        })
        .collect();

    let mut widths = COLUMN_HEADINGS.map(|heading| heading.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    push_line(&mut out, COLUMN_HEADINGS.iter().copied(), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (cell, &width) in cells.zip(widths) {
        let _ = write!(line, "{cell:<width$}  ");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render counts, summary and filtered rows as JSON
///
/// # Errors
///
/// Returns a serialization error, which does not happen for these types.
pub fn render_json(view: &DashboardView) -> Result<String> {
    let report = SnapshotReport {
        counts: view.counts().into(),
        summary: view.summary(),
        cases: view.filtered().iter().map(CaseRow::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Stay subscribed and print counts after every change until Ctrl-C
///
/// # Errors
///
/// Returns an error if the configuration is unusable or the Ctrl-C handler
/// cannot be installed.
pub async fn watch(config: &Config) -> Result<()> {
    let session = DashboardSession::mount(config)?;
    let mut changes = session.store().changes();

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    warn!("Dashboard store closed");
                    break;
                }
                let (counts, cases) = session
                    .store()
                    .read(|view| (view.counts(), view.cases().len()));
                info!(
                    parsed = counts.parsed,
                    saved = counts.saved,
                    total = counts.total(),
                    cases,
                    "Dashboard reloaded"
                );
                println!(
                    "parsed={} saved={} total={} cases={cases}",
                    counts.parsed,
                    counts.saved,
                    counts.total()
                );
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    session.unmount().await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use casedash_core::{CaseId, CaseRecord, DashboardSnapshot};
    use pretty_assertions::assert_eq;

    fn view() -> DashboardView {
        let case = |id, name: &str, group: &str, tpa: &str| CaseRecord {
            id: CaseId::Number(id),
            patient_name: name.to_string(),
            al_number: None,
            policy_number: Some(format!("POL-{id}")),
            hospital_group: group.to_string(),
            tpa_name: tpa.to_string(),
            parsed_time: None,
            saved_time: None,
            status: "Parsed".to_string(),
        };
        let mut view = DashboardView::new();
        view.apply_snapshot(
            DashboardSnapshot::new(
                DashboardCounts::new(5, 3),
                vec![
                    case(1, "Ravi Kumar", "Apollo", "Vidal"),
                    case(2, "Meena Shah", "Fortis", "Paramount"),
                ],
            ),
            false,
        );
        view
    }

    #[test]
    fn test_filters_apply_like_the_view() {
        let mut view = view();
        let filters = SnapshotFilters {
            group: Some("Fortis".to_string()),
            ..SnapshotFilters::default()
        };

        filters.apply(&mut view);

        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].patient_name, "Meena Shah");
        assert!(view.summary().unwrap().contains("Hospital Group: Fortis"));
    }

    #[test]
    fn test_no_filters_keeps_full_list() {
        let mut view = view();
        SnapshotFilters::default().apply(&mut view);

        assert_eq!(view.filtered().len(), 2);
        assert_eq!(view.summary(), None);
    }

    #[test]
    fn test_render_table() {
        let text = render_table(&view());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Parsed Cases: 5  Saved Cases: 3  Total Cases: 8");
        assert!(lines[2].starts_with("Patient Name  AL Number  Policy No"));
        assert!(lines[3].starts_with("Ravi Kumar    -          POL-1"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_render_json() {
        let mut view = view();
        view.set_search_text("ravi");
        view.apply_filters();

        let json: serde_json::Value = serde_json::from_str(&render_json(&view).unwrap()).unwrap();

        assert_eq!(json["counts"]["total"], 8);
        assert_eq!(json["cases"].as_array().unwrap().len(), 1);
        assert_eq!(json["cases"][0]["tat"], "-");
        assert_eq!(json["cases"][0]["status_class"], "parsed");
        assert!(json["summary"].as_str().unwrap().contains("Keyword: \"ravi\""));
    }
}
