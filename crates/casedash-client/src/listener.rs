//! Background listener that turns push events into reload notifications

use crate::push::PushChannel;
use casedash_core::config::PushConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reconnect behaviour of a [`LiveUpdateListener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Reconnect after the connection drops
    pub enabled: bool,
    /// First delay
    pub initial: Duration,
    /// Delay cap
    pub max: Duration,
}

impl From<&PushConfig> for Backoff {
    fn from(config: &PushConfig) -> Self {
        Self {
            enabled: config.reconnect,
            initial: config.reconnect_delay(),
            max: config.reconnect_delay_max(),
        }
    }
}

/// Listens on a push channel for one event name
#[derive(Debug, Clone)]
pub struct LiveUpdateListener {
    channel: PushChannel,
    event: String,
    backoff: Backoff,
}

impl LiveUpdateListener {
    /// Create a listener for `event` on `channel`
    #[must_use]
    pub fn new(channel: PushChannel, event: impl Into<String>, backoff: Backoff) -> Self {
        Self {
            channel,
            event: event.into(),
            backoff,
        }
    }

    /// Create a listener from push settings
    #[must_use]
    pub fn from_config(channel: PushChannel, config: &PushConfig) -> Self {
        Self::new(channel, config.event.clone(), Backoff::from(config))
    }

    /// Start listening; `on_update` runs once per matching event
    ///
    /// Event payloads are ignored. Must be called from within a Tokio runtime.
    pub fn subscribe<F>(self, on_update: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let notifications = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&notifications);

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = self.run(&counter, &on_update) => {}
                _ = shutdown_rx.recv() => {
                    debug!(event = %self.event, "Push listener shutting down");
                }
            }
        });

        Subscription {
            handle: Some(handle),
            shutdown_tx,
            notifications,
        }
    }

    async fn run<F>(&self, counter: &AtomicU64, on_update: &F)
    where
        F: Fn() + Send + Sync,
    {
        let mut delay = self.backoff.initial;

        loop {
            match self.channel.connect().await {
                Ok(mut connection) => {
                    delay = self.backoff.initial;
                    loop {
                        match connection.next_event().await {
                            Ok(Some(event)) if event.name == self.event => {
                                let seen = counter.fetch_add(1, Ordering::Relaxed) + 1;
                                debug!(event = %event.name, seen, "Live update received");
                                on_update();
                            }
                            Ok(Some(event)) => {
                                debug!(event = %event.name, "Ignoring push event");
                            }
                            Ok(None) => {
                                info!("Push channel closed by server");
                                break;
                            }
                            Err(e) => {
                                warn!(error = %e, "Push channel lost");
                                break;
                            }
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Push channel unavailable"),
            }

            if !self.backoff.enabled {
                info!("Push reconnect disabled, listener stopping");
                return;
            }

            debug!(?delay, "Reconnecting push channel");
            tokio::time::sleep(delay).await;
            delay = delay.saturating_mul(2).min(self.backoff.max);
        }
    }
}

/// Handle to a running listener
///
/// Dropping the handle stops the listener.
#[derive(Debug)]
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: broadcast::Sender<()>,
    notifications: Arc<AtomicU64>,
}

impl Subscription {
    /// Stop the listener and wait for it to finish
    ///
    /// No notification is delivered after this returns.
    pub async fn cancel(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            warn!(error = %e, "Push listener task failed");
        }
    }

    /// Whether the listener task is still running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Matching events delivered so far
    #[must_use]
    pub fn notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
