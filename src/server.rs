//! Line-oriented front end for a notifier
//!
//! Every non-empty input line is published as a check request, and every update
//! event is written to the output as one line.

use std::future::Future;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::notifier::Notifier;
use crate::pubsub::{Publisher, Subscriber, Subscription};
use crate::version::error::NotifyError;

/// Run a notifier fed from `input` until the input ends or `interrupt` completes
///
/// Check requests read before shutdown are still answered, and their update
/// events are written before this returns. Returns the number of check
/// requests received.
pub async fn serve<B, I, O, F>(
    notifier: &Arc<Notifier>,
    bus: &B,
    input: I,
    output: &mut O,
    interrupt: F,
) -> Result<usize, NotifyError>
where
    B: Publisher + Subscriber + ?Sized,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let channels = notifier.channels();
    let updates = bus.subscribe(&channels.update)?;
    let running = notifier.start().await?;

    let shutdown = async {
        tokio::select! {
            _ = interrupt => info!("Interrupted"),
            _ = read_requests(input, bus, &channels.check) => info!("Input closed"),
        }
    };

    let (stop_tx, stop_rx) = oneshot::channel();
    let run = async {
        let received = running.run_until(shutdown).await;
        let _ = stop_tx.send(());
        received
    };

    let (received, ()) = tokio::join!(run, write_updates(updates, output, stop_rx));
    info!("Handled {} check requests", received);
    Ok(received)
}

async fn read_requests<I, P>(input: I, publisher: &P, channel: &str)
where
    I: AsyncBufRead + Unpin,
    P: Publisher + ?Sized,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = publisher.publish(channel, line).await {
                    error!("Failed to queue check request: {}", e);
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read check request: {}", e);
                break;
            }
        }
    }
}

/// Write update events until `stop` fires, then flush the ones already queued
async fn write_updates<O>(
    mut updates: Subscription,
    output: &mut O,
    mut stop: oneshot::Receiver<()>,
) where
    O: AsyncWrite + Unpin,
{
    let mut draining = false;
    loop {
        let payload = if draining {
            match updates.next().now_or_never() {
                Some(Some(payload)) => payload,
                _ => break,
            }
        } else {
            tokio::select! {
                biased;
                payload = updates.next() => match payload {
                    Some(payload) => payload,
                    None => break,
                },
                _ = &mut stop => {
                    draining = true;
                    continue;
                }
            }
        };

        if let Err(e) = write_line(output, &payload).await {
            error!("Failed to write update: {}", e);
            break;
        }
    }
}

async fn write_line<O>(output: &mut O, payload: &str) -> std::io::Result<()>
where
    O: AsyncWrite + Unpin,
{
    output.write_all(payload.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
