//! In-memory queue for testing and single-process scenarios.

use std::sync::{Arc, RwLock};

use super::{Event, PublishError, Sender};

/// A [`Sender`] that records every event it is handed.
///
/// Thread-safe and clone-friendly: clones share the same log, so a test can
/// keep one handle and give another to the service under test.
///
/// ## Example
///
/// ```
/// use orderpay::bus::{Event, InMemoryQueue, Sender};
///
/// let queue = InMemoryQueue::new();
/// queue
///     .send("payments.requested", Event::new("evt-1", "PaymentRequested", b"{}".to_vec()))
///     .unwrap();
///
/// assert_eq!(queue.len(), 1);
/// assert_eq!(queue.sent_to("payments.requested").len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<(String, Event)>>>,
}

impl InMemoryQueue {
    /// Create a new in-memory queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, in the order they were sent.
    pub fn events(&self) -> Vec<Event> {
        self.log
            .read()
            .map(|log| log.iter().map(|(_, e)| e.clone()).collect())
            .unwrap_or_default()
    }

    /// Events sent to one queue.
    pub fn sent_to(&self, queue: &str) -> Vec<Event> {
        self.log
            .read()
            .map(|log| {
                log.iter()
                    .filter(|(q, _)| q == queue)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find the first event of a type.
    pub fn find_by_type(&self, event_type: &str) -> Option<Event> {
        self.events().into_iter().find(|e| e.event_type == event_type)
    }

    /// Total number of events sent.
    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sender for InMemoryQueue {
    fn send(&self, queue: &str, event: Event) -> Result<(), PublishError> {
        let mut log = self.log.write().map_err(|_| PublishError::LockPoisoned)?;
        log.push((queue.to_string(), event));
        Ok(())
    }
}
