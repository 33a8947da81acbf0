//! Pub/sub test utilities

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::timeout;

use update_notifier::pubsub::{LocalBus, Subscriber};

/// Collect payloads from a channel in background and return a receiver
pub fn spawn_update_collector(bus: &LocalBus, channel: &str) -> mpsc::Receiver<String> {
    let mut subscription = bus.subscribe(channel).unwrap();
    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        while let Some(payload) = subscription.next().await {
            if tx.send(payload).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Wait for the next payload, giving up after a few seconds
pub async fn wait_for_update(rx: &mut mpsc::Receiver<String>) -> Option<String> {
    timeout(Duration::from_secs(5), rx.recv()).await.ok().flatten()
}

/// Returns true if nothing arrives within a short grace period
pub async fn expect_no_update(rx: &mut mpsc::Receiver<String>) -> bool {
    timeout(Duration::from_millis(200), rx.recv()).await.is_err()
}
