//! orderpay — order and payment microservices.
//!
//! Two independent REST services share this crate:
//!
//! - the **order service** checks out a cart into a `Pending` order, tracks
//!   its status and settles it once a payment reference is supplied;
//! - the **payment service** records payments made through a gateway and
//!   the refunds initiated against them.
//!
//! Both follow the same three layers: an HTTP router decodes requests and
//! maps errors, a service validates and orchestrates, a repository talks to
//! the store. The services are only eventually consistent with each other:
//! checkout sends a best-effort [`order::PaymentRequested`] notice and never
//! waits for it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use orderpay::order::{InMemoryOrderRepository, OrderItem, OrderService};
//! use orderpay::UserId;
//!
//! let service = OrderService::new(Arc::new(InMemoryOrderRepository::new()));
//! let user = UserId::new("user-1")?;
//! let order = service
//!     .create_order(&user, vec![OrderItem::new(7, 2, 10.into())], "A".into())
//!     .await?;
//! service.process_payment(&order.id, "pay_1").await?;
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod ids;
pub mod order;
pub mod payment;
pub mod store;
pub mod telemetry;

#[cfg(feature = "http")]
pub mod http;

pub use crate::config::Settings;
pub use error::ServiceError;
pub use ids::{IdError, OrderId, UserId};
pub use store::StoreError;
