//! Background dispatch for fire-and-forget sends.
//!
//! [`ChannelSender`] puts events on a bounded tokio channel and returns.
//! A single worker task drains the channel and hands each event to a
//! [`Deliver`] implementation. Failures are logged and counted; nothing is
//! retried and nothing is reported back to the sender. When the worker falls
//! behind and the channel is full, `send` fails at once with
//! [`PublishError::Full`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::{Event, PublishError, Sender};

/// Error from a delivery attempt.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

impl DeliveryError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The far side of a [`ChannelSender`]: actually moves an event somewhere.
#[async_trait]
pub trait Deliver: Send + Sync + 'static {
    async fn deliver(&self, queue: &str, event: &Event) -> Result<(), DeliveryError>;
}

/// Counters shared between the worker and its handle.
#[derive(Debug, Default)]
pub struct DispatchStats {
    delivered: AtomicUsize,
    failed: AtomicUsize,
}

impl DispatchStats {
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

struct Envelope {
    queue: String,
    event: Event,
}

/// A [`Sender`] that hands events to a background worker.
///
/// Clones share the same channel. The worker stops once every clone has been
/// dropped and the channel is drained.
///
/// Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct ChannelSender {
    tx: mpsc::Sender<Envelope>,
}

/// Handle on the dispatch worker.
pub struct DispatchHandle {
    stats: Arc<DispatchStats>,
    task: JoinHandle<()>,
}

impl DispatchHandle {
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish. Only returns after all senders are
    /// dropped.
    pub async fn join(self) -> Arc<DispatchStats> {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "dispatch worker panicked");
        }
        self.stats
    }
}

impl ChannelSender {
    /// Spawn the dispatch worker and return a sender feeding it.
    ///
    /// At most `capacity` events wait for delivery (a capacity of 0 is
    /// treated as 1).
    pub fn spawn<D: Deliver>(deliver: D, capacity: usize) -> (Self, DispatchHandle) {
        let (tx, mut rx) = mpsc::channel::<Envelope>(capacity.max(1));
        let stats = Arc::new(DispatchStats::default());
        let worker_stats = Arc::clone(&stats);

        let task = tokio::spawn(async move {
            while let Some(Envelope { queue, event }) = rx.recv().await {
                match deliver.deliver(&queue, &event).await {
                    Ok(()) => {
                        worker_stats.delivered.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(queue = %queue, event_id = %event.id, "event delivered");
                    }
                    Err(e) => {
                        worker_stats.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(
                            queue = %queue,
                            event_id = %event.id,
                            event_type = %event.event_type,
                            error = %e,
                            "event delivery failed"
                        );
                    }
                }
            }
            tracing::debug!("dispatch worker stopped");
        });

        (Self { tx }, DispatchHandle { stats, task })
    }
}

impl Sender for ChannelSender {
    fn send(&self, queue: &str, event: Event) -> Result<(), PublishError> {
        self.tx
            .try_send(Envelope {
                queue: queue.to_string(),
                event,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => PublishError::Full(queue.to_string()),
                TrySendError::Closed(_) => PublishError::Closed(queue.to_string()),
            })
    }
}
