//! Payment side: gateway calls, payment records, refunds and provider
//! notifications.
//!
//! The payment service never reads orders. It only keeps the order id it was
//! given, so the two services stay independently consistent.

mod gateway;
mod model;
mod repository;
mod service;
mod webhook;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use gateway::{DummyGateway, GatewayError, PaymentGateway};
pub use model::{NewPayment, Payment, PaymentStatus, Refund, RefundStatus};
pub use repository::{InMemoryPaymentRepository, PaymentRepository};
pub use service::PaymentService;
pub use webhook::{IgnoreNotifications, NotificationHandler};

#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePaymentRepository;
