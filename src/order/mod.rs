//! Order side: checkout, order history, status changes and settlement.

mod model;
mod notify;
mod repository;
mod service;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use model::{Order, OrderItem, OrderStatus};
pub use notify::{PaymentRequested, PAYMENT_QUEUE, PAYMENT_REQUESTED};
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;

#[cfg(feature = "http")]
pub use notify::HttpPaymentRequests;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteOrderRepository;
