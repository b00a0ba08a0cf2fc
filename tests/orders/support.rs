//! Shared fixtures for the order tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orderpay::order::{InMemoryOrderRepository, Order, OrderItem, OrderRepository, OrderStatus};
use orderpay::{OrderId, StoreError, UserId};
use rust_decimal::Decimal;

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn pizza(quantity: i32) -> OrderItem {
    OrderItem::new(7, quantity, Decimal::TEN).named("margherita")
}

pub fn cart() -> Vec<OrderItem> {
    vec![pizza(2)]
}

/// Delays every call, to exercise the store timeout.
pub struct SlowRepository {
    pub inner: InMemoryOrderRepository,
    pub delay: Duration,
}

#[async_trait]
impl OrderRepository for SlowRepository {
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.create(order).await
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(id).await
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_by_user(user_id).await
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.update_status(id, status, at).await
    }

    async fn settle(&self, id: &OrderId, payment_id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.settle(id, payment_id, at).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }
}

pub fn in_memory() -> Arc<dyn OrderRepository> {
    Arc::new(InMemoryOrderRepository::new())
}
