//! Core data types for the dashboard

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Case identifier as sent by the backend
///
/// The backend may key cases by a numeric row id or by an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseId {
    /// Numeric identifier
    Number(i64),
    /// Textual identifier
    Text(String),
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}

/// One bot-processed case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Unique identifier for the case
    pub id: CaseId,

    /// Patient name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub patient_name: String,

    /// Authorization letter number
    #[serde(default)]
    pub al_number: Option<String>,

    /// Insurance policy number
    #[serde(default)]
    pub policy_number: Option<String>,

    /// Hospital group the case belongs to
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hospital_group: String,

    /// Third-party administrator name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tpa_name: String,

    /// When the bot parsed the case (raw timestamp text)
    #[serde(default)]
    pub parsed_time: Option<String>,

    /// When the bot saved the case (raw timestamp text)
    #[serde(default)]
    pub saved_time: Option<String>,

    /// Processing status
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
}

impl CaseRecord {
    /// AL number, or the empty string when absent
    #[must_use]
    pub fn al_number_or_empty(&self) -> &str {
        self.al_number.as_deref().unwrap_or_default()
    }

    /// Policy number, or the empty string when absent
    #[must_use]
    pub fn policy_number_or_empty(&self) -> &str {
        self.policy_number.as_deref().unwrap_or_default()
    }

    /// Status as a lowercase display class
    #[must_use]
    pub fn status_class(&self) -> String {
        self.status.to_lowercase()
    }
}

/// Aggregate processing counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    /// Number of cases parsed
    pub parsed: u64,

    /// Number of cases saved
    pub saved: u64,
}

impl DashboardCounts {
    /// Create counts from their two components
    #[must_use]
    pub const fn new(parsed: u64, saved: u64) -> Self {
        Self { parsed, saved }
    }

    /// Total cases, derived from parsed and saved
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.parsed.saturating_add(self.saved)
    }
}

/// Result of one successful load, applied as a unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Aggregate counts
    pub counts: DashboardCounts,

    /// Case list in backend order
    pub cases: Vec<CaseRecord>,
}

impl DashboardSnapshot {
    /// Create a snapshot
    #[must_use]
    pub const fn new(counts: DashboardCounts, cases: Vec<CaseRecord>) -> Self {
        Self { counts, cases }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
