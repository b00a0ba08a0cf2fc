//! Order persistence trait and the in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Order, OrderStatus};
use crate::ids::{OrderId, UserId};
use crate::store::{MemoryTable, Record, StoreError};

/// Storage for orders. Owns no business rules beyond the conditional write in
/// [`settle`](OrderRepository::settle).
///
/// Soft-deleted orders are invisible to every method.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order together with its items.
    async fn create(&self, order: &Order) -> Result<(), StoreError>;

    /// Fetch an order with its items, in checkout order.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// All orders of a user, newest first. Orders created at the same
    /// instant come back most recently inserted first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError>;

    /// Overwrite the status. Fails with `NotFound` when there is no live row.
    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Record `payment_id` and set `Paid`, but only while the stored order is
    /// still `Pending`. Returns whether the write happened.
    async fn settle(&self, id: &OrderId, payment_id: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Number of live orders.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory order repository. Clones share the same table.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    table: MemoryTable<Order>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft-delete an order. Only used to exercise visibility rules.
    pub fn soft_delete(&self, id: &OrderId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let deleted = self.table.update(&id.to_string(), |order| {
            order.deleted_at.get_or_insert(at);
        })?;
        Ok(deleted.is_some())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        self.table.insert(order.clone())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.table.get(&id.to_string())?.filter(Order::is_live))
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders = self
            .table
            .find(|order| order.is_live() && &order.user_id == user_id)?;
        // newest insertion first, then a stable sort keeps that for equal timestamps
        orders.reverse();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let updated = self.table.update(&id.to_string(), |order| {
            if order.is_live() {
                order.set_status(status, at);
                true
            } else {
                false
            }
        })?;
        match updated {
            Some(true) => Ok(()),
            _ => Err(StoreError::not_found(Order::TABLE, id)),
        }
    }

    async fn settle(&self, id: &OrderId, payment_id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let settled = self
            .table
            .update(&id.to_string(), |order| order.is_live() && order.settle(payment_id, at))?;
        Ok(settled.unwrap_or(false))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.find(Order::is_live)?.len())
    }
}
