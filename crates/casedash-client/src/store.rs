//! Shared dashboard state with a guarded two-phase apply
//!
//! A load first takes a [`LoadTicket`], fetches, then commits its snapshot.
//! The commit decides whether the snapshot may still be applied: it is
//! dropped once the view is unmounted, and under
//! [`ReloadPolicy::LatestRequest`] also when a later-issued load already won.

use casedash_core::DashboardSnapshot;
use casedash_core::DashboardView;
use casedash_core::config::{ReloadConfig, ReloadPolicy};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Proof that a load was started, ordered by issue time
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket {
    seq: u64,
}

impl LoadTicket {
    /// Issue sequence number, starting at 1
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a committed snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshot replaced the view's data
    Applied,
    /// A later-issued load had already been applied
    Stale,
    /// The view was unmounted before the load completed
    Unmounted,
}

#[derive(Debug)]
struct StoreInner {
    view: DashboardView,
    issued: u64,
    applied: u64,
    loads_applied: u64,
    mounted: bool,
}

/// Dashboard state shared between the loader, the listener and the renderer
#[derive(Debug, Clone)]
pub struct DashboardStore {
    inner: Arc<RwLock<StoreInner>>,
    config: ReloadConfig,
    revision: Arc<watch::Sender<u64>>,
}

impl DashboardStore {
    /// Create an empty, mounted store
    #[must_use]
    pub fn new(config: ReloadConfig) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                view: DashboardView::new(),
                issued: 0,
                applied: 0,
                loads_applied: 0,
                mounted: true,
            })),
            config,
            revision: Arc::new(revision),
        }
    }

    /// Start a load
    #[must_use]
    pub fn begin_load(&self) -> LoadTicket {
        let mut inner = self.inner.write();
        inner.issued += 1;
        LoadTicket { seq: inner.issued }
    }

    /// Finish a load by applying its snapshot, if it is still wanted
    pub fn commit(&self, ticket: LoadTicket, snapshot: DashboardSnapshot) -> ApplyOutcome {
        let mut inner = self.inner.write();

        if !inner.mounted {
            debug!(seq = ticket.seq, "Discarding load for unmounted dashboard");
            return ApplyOutcome::Unmounted;
        }

        if self.config.policy == ReloadPolicy::LatestRequest && ticket.seq < inner.applied {
            warn!(
                seq = ticket.seq,
                applied = inner.applied,
                "Discarding stale dashboard load"
            );
            return ApplyOutcome::Stale;
        }

        inner
            .view
            .apply_snapshot(snapshot, self.config.reapply_filters);
        inner.applied = inner.applied.max(ticket.seq);
        inner.loads_applied += 1;
        drop(inner);

        self.bump();
        ApplyOutcome::Applied
    }

    /// Read the view
    pub fn read<R>(&self, f: impl FnOnce(&DashboardView) -> R) -> R {
        f(&self.inner.read().view)
    }

    /// Change filter selection or other view state
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardView) -> R) -> R {
        let result = f(&mut self.inner.write().view);
        self.bump();
        result
    }

    /// Copy of the current view
    #[must_use]
    pub fn view(&self) -> DashboardView {
        self.read(DashboardView::clone)
    }

    /// Number of loads applied so far
    #[must_use]
    pub fn loads_applied(&self) -> u64 {
        self.inner.read().loads_applied
    }

    /// Monotonic change counter, bumped on every applied load or update
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that observes every revision change
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Stop accepting loads; every later commit is discarded
    pub fn detach(&self) {
        self.inner.write().mounted = false;
    }

    /// Whether loads are still applied
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.read().mounted
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
