//! Bus - fire-and-forget messaging between the services.
//!
//! The order service never calls the payment service inline. It hands a
//! message to a [`Sender`], which must return without waiting on delivery.
//! What happens afterwards (an HTTP call, a broker publish, nothing at all)
//! is the sender's business and never reaches the caller.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  send(queue, event)  ┌────────────────┐
//! │ OrderService │ ───────────────────▶ │ Sender         │
//! └──────────────┘   returns at once    │  InMemoryQueue │ (records, tests)
//!                                       │  ChannelSender │ ─┐
//!                                       └────────────────┘  │ bounded channel (full: dropped)
//!                                                           ▼
//!                                       ┌────────────────────────────┐
//!                                       │ dispatch worker (tokio)    │
//!                                       │ Deliver::deliver(&event)   │
//!                                       │ failures logged, no retry  │
//!                                       └────────────────────────────┘
//! ```

mod dispatch;
mod event;
mod in_memory_queue;
mod sender;

pub use dispatch::{ChannelSender, Deliver, DeliveryError, DispatchHandle, DispatchStats};
pub use event::{Event, PublishError};
pub use in_memory_queue::InMemoryQueue;
pub use sender::Sender;
