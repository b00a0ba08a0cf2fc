//! Sender trait for point-to-point messaging.

use super::event::{Event, PublishError};

/// Trait for sending events to a named queue (point-to-point).
///
/// `send` must not wait on delivery: it either enqueues the event and
/// returns, or fails immediately. Delivery outcome is never reported back.
pub trait Sender: Send + Sync {
    /// Send an event to a named queue.
    fn send(&self, queue: &str, event: Event) -> Result<(), PublishError>;
}
