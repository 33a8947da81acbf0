//! Check-and-notify pipeline
//!
//! Each message on the check channel names one package. The notifier fetches the
//! package from the registry, compares the `latest` dist tag with the module
//! registry snapshot, and publishes at most one update event.
//!
//! ```text
//! Received ─▶ Fetching ─▶ Comparing ─┬─▶ Notify ───┬─▶ Done
//!                │            │      └─▶ Suppress ─┘
//!                └────────────┴─▶ Failed
//! ```
//!
//! Failures stay inside the check that produced them: they are logged and the
//! subscription keeps running. Nothing is retried.

pub mod in_flight;

use std::future::Future;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::{ChannelsConfig, NotifierConfig, NotifyConfig, PayloadFormat};
use crate::notifier::in_flight::InFlight;
use crate::pubsub::{Publisher, Subscriber, Subscription};
use crate::version::cache::VersionCache;
use crate::version::checker::{Decision, compare_version};
use crate::version::error::NotifyError;
use crate::version::registry::Registry;
use crate::version::types::VersionedModule;

/// How a single check ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A new version was announced
    Notified(VersionedModule),
    /// The registry has nothing new
    Suppressed,
    /// Another check of the same package was still running
    Skipped,
}

pub struct Notifier {
    registry: Arc<dyn Registry>,
    cache: Arc<VersionCache>,
    publisher: Arc<dyn Publisher>,
    subscriber: Arc<dyn Subscriber>,
    channels: ChannelsConfig,
    options: NotifyConfig,
    in_flight: InFlight,
}

impl Notifier {
    pub fn new(
        registry: Arc<dyn Registry>,
        cache: Arc<VersionCache>,
        publisher: Arc<dyn Publisher>,
        subscriber: Arc<dyn Subscriber>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            publisher,
            subscriber,
            channels: config.channels,
            options: config.notifier,
            in_flight: InFlight::new(),
        }
    }

    pub fn channels(&self) -> &ChannelsConfig {
        &self.channels
    }

    /// Load the module registry and subscribe to the check channel
    ///
    /// The snapshot is read on the blocking pool. A module registry that
    /// cannot be loaded is fatal: no subscription is made.
    pub async fn start(self: &Arc<Self>) -> Result<RunningNotifier, NotifyError> {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || cache.load())
            .await?
            .inspect_err(|e| {
                error!("Not starting, module registry unavailable: {}", e);
            })?;

        let subscription = self.subscriber.subscribe(&self.channels.check)?;
        info!(
            "Listening on {} ({} known packages), announcing on {}",
            self.channels.check,
            self.cache.len(),
            self.channels.update
        );

        Ok(RunningNotifier {
            notifier: Arc::clone(self),
            subscription,
        })
    }

    /// Run one check-and-notify cycle for a check request payload
    pub async fn handle_check_request(&self, payload: &str) -> Result<CheckOutcome, NotifyError> {
        let package_name = parse_check_payload(payload);

        let _guard = if self.options.single_flight {
            match self.in_flight.try_start(&package_name) {
                Some(guard) => Some(guard),
                None => {
                    info!("Skipping {}: already being checked", package_name);
                    return Ok(CheckOutcome::Skipped);
                }
            }
        } else {
            None
        };

        debug!("Fetching {}", package_name);
        let metadata = self.registry.fetch_latest(&package_name).await?;

        let Some(latest) = metadata.latest() else {
            return Err(NotifyError::ModuleVersionsNotFound(package_name));
        };

        let cached = self.cache.get(&package_name);
        let comparison = compare_version(cached.as_deref(), latest);
        debug!(
            "Comparing {}: cached {:?}, latest {} -> {:?}",
            package_name, comparison.cached_version, comparison.latest_version, comparison.status
        );

        match comparison.status.decide(self.options.unknown_packages) {
            Decision::Suppress => Ok(CheckOutcome::Suppressed),
            Decision::Notify => {
                let module = VersionedModule::new(package_name, comparison.latest_version);
                self.notify(&module).await?;
                Ok(CheckOutcome::Notified(module))
            }
        }
    }

    async fn notify(&self, module: &VersionedModule) -> Result<(), NotifyError> {
        let payload = match self.options.payload {
            PayloadFormat::Versioned => serde_json::to_string(module)?,
            PayloadFormat::Legacy => module.version.clone(),
        };

        self.publisher.publish(&self.channels.update, payload).await?;
        info!("Announced {}@{}", module.name, module.version);

        self.cache.record(module);
        Ok(())
    }

    /// Handle a message from the subscription, logging the result
    async fn process(&self, payload: String) {
        match self.handle_check_request(&payload).await {
            Ok(CheckOutcome::Notified(_)) | Ok(CheckOutcome::Skipped) => {}
            Ok(CheckOutcome::Suppressed) => {
                debug!("No new version for {}", parse_check_payload(&payload))
            }
            Err(e) => error!(
                "Check for {:?} failed: {}",
                parse_check_payload(&payload),
                e
            ),
        }
    }
}

/// A notifier subscribed to its check channel
pub struct RunningNotifier {
    notifier: Arc<Notifier>,
    subscription: Subscription,
}

impl RunningNotifier {
    /// Process check requests until the channel closes
    pub async fn run(self) -> usize {
        self.run_until(std::future::pending()).await
    }

    /// Process check requests until `shutdown` completes or the channel closes
    ///
    /// Every message is checked on its own task. Once shutdown completes, the
    /// messages already queued are checked, nothing newer is read, and the
    /// checks already started are awaited.
    /// Returns the number of messages received.
    pub async fn run_until<F>(self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let RunningNotifier {
            notifier,
            mut subscription,
        } = self;
        let mut tasks = JoinSet::new();
        let mut received = 0;
        tokio::pin!(shutdown);

        let spawn_check = |tasks: &mut JoinSet<()>, payload: String| {
            let notifier = Arc::clone(&notifier);
            tasks.spawn(async move { notifier.process(payload).await });
        };

        loop {
            tokio::select! {
                biased;
                message = subscription.next() => match message {
                    Some(payload) => {
                        received += 1;
                        spawn_check(&mut tasks, payload);
                    }
                    None => {
                        warn!("Check channel closed");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting check requests");
                    // Requests already queued on the channel still get their check
                    while let Some(Some(payload)) = subscription.next().now_or_never() {
                        received += 1;
                        spawn_check(&mut tasks, payload);
                    }
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
            }
        }

        if !tasks.is_empty() {
            info!("Waiting for {} in-flight checks", tasks.len());
        }
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        received
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Check task failed: {}", e);
    }
}

/// Extract the package name from a check request payload
///
/// Accepts a bare name or a JSON string.
pub fn parse_check_payload(payload: &str) -> String {
    let trimmed = payload.trim();
    if trimmed.starts_with('"')
        && let Ok(name) = serde_json::from_str::<String>(trimmed)
    {
        return name.trim().to_string();
    }
    trimmed.to_string()
}
