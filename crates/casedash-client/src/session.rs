//! Dashboard session lifecycle: mount, live reloads, unmount

use crate::api_client::ApiClient;
use crate::listener::{LiveUpdateListener, Subscription};
use crate::loader::DataLoader;
use crate::push::PushChannel;
use crate::store::DashboardStore;
use casedash_core::config::PushConfig;
use casedash_core::{Config, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A mounted dashboard
///
/// Mounting starts an initial load and subscribes to live updates; every
/// matching push event triggers a full reload. Unmounting stops the
/// listener and discards any load still in flight.
#[derive(Debug)]
pub struct DashboardSession {
    store: DashboardStore,
    loader: DataLoader,
    channel: PushChannel,
    push: PushConfig,
    subscription: Option<Subscription>,
}

impl DashboardSession {
    /// Mount a dashboard for `config`
    ///
    /// Must be called from within a Tokio runtime. The initial load runs in
    /// the background; a failed load is logged and leaves the view empty.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is unusable.
    pub fn mount(config: &Config) -> Result<Self> {
        let mut session = Self::new(config)?;
        session.spawn_reload();
        session.subscribe();
        info!(base_url = %config.base_url(), "Dashboard mounted");
        Ok(session)
    }

    /// Build a session without loading or subscribing
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is unusable.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::new();
        let api = ApiClient::with_client(http.clone(), config.base_url())?;
        let channel = PushChannel::with_client(http, config.base_url(), &config.push)?;

        Ok(Self {
            store: DashboardStore::new(config.reload.clone()),
            loader: DataLoader::new(api),
            channel,
            push: config.push.clone(),
            subscription: None,
        })
    }

    /// Shared dashboard state
    #[must_use]
    pub const fn store(&self) -> &DashboardStore {
        &self.store
    }

    /// Loader used for reloads
    #[must_use]
    pub const fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// Load now and wait for the result
    ///
    /// # Errors
    ///
    /// Returns the load error; the view keeps its previous state.
    pub async fn reload(&self) -> Result<()> {
        self.loader.load_into(&self.store).await.map(|_| ())
    }

    /// Start a load in the background
    pub fn spawn_reload(&self) -> JoinHandle<()> {
        spawn_load(self.loader.clone(), self.store.clone())
    }

    /// Subscribe to live updates, replacing any earlier subscription
    pub fn subscribe(&mut self) {
        let loader = self.loader.clone();
        let store = self.store.clone();
        let listener = LiveUpdateListener::from_config(self.channel.clone(), &self.push);

        let subscription = listener.subscribe(move || {
            spawn_load(loader.clone(), store.clone());
        });

        if self.subscription.replace(subscription).is_some() {
            debug!("Replaced existing live update subscription");
        }
    }

    /// Whether a live update subscription is running
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Live update notifications received by the current subscription
    #[must_use]
    pub fn notifications(&self) -> u64 {
        self.subscription
            .as_ref()
            .map_or(0, Subscription::notifications)
    }

    /// Stop live updates and discard in-flight loads
    pub async fn unmount(mut self) {
        self.store.detach();
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel().await;
        }
        info!("Dashboard unmounted");
    }
}

fn spawn_load(loader: DataLoader, store: DashboardStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        // failures are logged by the loader
        let _ = loader.load_into(&store).await;
    })
}
