//! Order service: checkout, lookup, status changes and settlement.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::model::{Order, OrderItem, OrderStatus};
use super::notify::{PaymentRequested, PAYMENT_QUEUE};
use super::repository::OrderRepository;
use crate::bus::Sender;
use crate::error::ServiceError;
use crate::ids::{OrderId, UserId};
use crate::store::{bounded, Record, StoreError, DEFAULT_STORE_TIMEOUT};

/// Validates input and orchestrates the order repository.
///
/// Every repository call is bounded by the store timeout. After a checkout
/// the service hands a [`PaymentRequested`] notice to the configured
/// [`Sender`] and moves on: the outcome of that notice never changes the
/// checkout result.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    payment_notices: Option<Arc<dyn Sender>>,
    store_timeout: Duration,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self {
            repo,
            payment_notices: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Send a payment notice after every successful checkout.
    pub fn with_payment_notices(mut self, sender: Arc<dyn Sender>) -> Self {
        self.payment_notices = Some(sender);
        self
    }

    pub fn with_store_timeout(mut self, limit: Duration) -> Self {
        self.store_timeout = limit;
        self
    }

    /// Check out a cart into a new `Pending` order.
    ///
    /// Validation runs before anything is persisted.
    pub async fn create_order(
        &self,
        user_id: &UserId,
        items: Vec<OrderItem>,
        delivery_address: String,
    ) -> Result<Order, ServiceError> {
        let order = Order::checkout(user_id.clone(), items, delivery_address, Utc::now())?;

        bounded(self.store_timeout, "orders.create", self.repo.create(&order)).await?;
        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            items = order.items.len(),
            total = %order.total_amount,
            "order created"
        );

        self.request_payment(&order);
        Ok(order)
    }

    /// Fire-and-forget: failures are logged, never returned.
    fn request_payment(&self, order: &Order) {
        let Some(sender) = &self.payment_notices else {
            return;
        };
        let sent = PaymentRequested::for_order(order)
            .to_event()
            .and_then(|event| sender.send(PAYMENT_QUEUE, event));
        if let Err(e) = sent {
            tracing::warn!(order_id = %order.id, error = %e, "payment notice not sent");
        }
    }

    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ServiceError> {
        tracing::debug!(order_id = %id, "get order");
        bounded(self.store_timeout, "orders.get", self.repo.get(id))
            .await?
            .ok_or_else(|| StoreError::not_found(Order::TABLE, id).into())
    }

    /// A user's orders, newest first. Empty when the user has none.
    pub async fn get_order_history(&self, user_id: &UserId) -> Result<Vec<Order>, ServiceError> {
        tracing::debug!(user_id = %user_id, "get order history");
        Ok(bounded(self.store_timeout, "orders.list_by_user", self.repo.list_by_user(user_id)).await?)
    }

    /// Overwrite the status. Any status may replace any other.
    pub async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), ServiceError> {
        bounded(
            self.store_timeout,
            "orders.update_status",
            self.repo.update_status(id, status, Utc::now()),
        )
        .await?;
        tracing::info!(order_id = %id, status = %status, "order status updated");
        Ok(())
    }

    /// Settle an order with a payment reference.
    ///
    /// The reference must be non-empty and the order must currently be
    /// `Pending`. The final write is conditional, so of two concurrent
    /// settlements exactly one succeeds and the other sees `InvalidState`.
    pub async fn process_payment(&self, id: &OrderId, payment_id: &str) -> Result<Order, ServiceError> {
        let payment_id = payment_id.trim();
        if payment_id.is_empty() {
            return Err(ServiceError::validation("payment id must not be empty"));
        }

        let order = self.get_order(id).await?;
        if order.status != OrderStatus::Pending {
            return Err(ServiceError::invalid_state(format!(
                "order {} is {}, expected {}",
                id,
                order.status,
                OrderStatus::Pending
            )));
        }

        let now = Utc::now();
        let settled = bounded(self.store_timeout, "orders.settle", self.repo.settle(id, payment_id, now)).await?;
        if !settled {
            return Err(ServiceError::invalid_state(format!(
                "order {} was settled concurrently",
                id
            )));
        }

        tracing::info!(order_id = %id, payment_id, "order paid");
        let mut paid = order;
        paid.settle(payment_id, now);
        Ok(paid)
    }
}
