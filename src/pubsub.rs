//! Publish/subscribe transport
//!
//! The notifier only sees the [`Publisher`] and [`Subscriber`] traits. [`LocalBus`]
//! is an in-process implementation backed by tokio broadcast channels.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures::stream::{self, BoxStream, StreamExt};
#[cfg(test)]
use mockall::automock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::version::error::TransportError;

/// Stream of payloads received on a channel
pub type Subscription = BoxStream<'static, String>;

/// Default number of messages buffered per channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a payload on a channel
    async fn publish(&self, channel: &str, payload: String) -> Result<(), TransportError>;
}

pub trait Subscriber: Send + Sync {
    /// Subscribe to a channel. Messages published afterwards are delivered.
    fn subscribe(&self, channel: &str) -> Result<Subscription, TransportError>;
}

/// In-process message bus with one broadcast channel per topic
pub struct LocalBus {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<String> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Publisher for LocalBus {
    async fn publish(&self, channel: &str, payload: String) -> Result<(), TransportError> {
        match self.sender(channel).send(payload) {
            Ok(receivers) => debug!("Published on {} to {} subscribers", channel, receivers),
            // Like a pub/sub server, a message nobody listens to is dropped
            Err(_) => debug!("Published on {} with no subscribers", channel),
        }
        Ok(())
    }
}

impl Subscriber for LocalBus {
    fn subscribe(&self, channel: &str) -> Result<Subscription, TransportError> {
        let receiver = self.sender(channel).subscribe();
        let channel = channel.to_string();

        let stream = stream::unfold(receiver, move |mut receiver| {
            let channel = channel.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(payload) => return Some((payload, receiver)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Subscriber on {} lagged, {} messages dropped", channel, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(stream.boxed())
    }
}
