//! Data loader: fetch counts and cases together, apply them as one unit

use crate::api_client::ApiClient;
use crate::store::{ApplyOutcome, DashboardStore};
use casedash_core::{DashboardSnapshot, Result};
use tracing::{debug, error, instrument};

/// Loads dashboard snapshots from the backend
#[derive(Debug, Clone)]
pub struct DataLoader {
    api: ApiClient,
}

impl DataLoader {
    /// Create a loader over an API client
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying API client
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fetch counts and cases concurrently
    ///
    /// Succeeds only when both requests succeed.
    ///
    /// # Errors
    ///
    /// Returns the first request error.
    pub async fn fetch_snapshot(&self) -> Result<DashboardSnapshot> {
        let (counts, cases) = tokio::try_join!(self.api.get_counts(), self.api.get_cases())?;
        Ok(DashboardSnapshot::new(counts, cases))
    }

    /// Fetch a snapshot and commit it to `store`
    ///
    /// A failed fetch is logged and leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after logging it.
    #[instrument(skip_all, fields(base_url = %self.api.base_url()))]
    pub async fn load_into(&self, store: &DashboardStore) -> Result<ApplyOutcome> {
        let ticket = store.begin_load();
        let seq = ticket.seq();

        match self.fetch_snapshot().await {
            Ok(snapshot) => {
                let counts = snapshot.counts;
                let cases = snapshot.cases.len();
                let outcome = store.commit(ticket, snapshot);
                debug!(
                    seq,
                    parsed = counts.parsed,
                    saved = counts.saved,
                    cases,
                    ?outcome,
                    "Dashboard load finished"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(seq, error = %e, "Failed to load dashboard");
                Err(e)
            }
        }
    }
}
