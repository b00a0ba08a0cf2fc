//! Payment persistence trait and the in-memory implementation.

use async_trait::async_trait;

use super::model::{Payment, Refund};
use crate::store::{MemoryTable, StoreError};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn save(&self, payment: &Payment) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, StoreError>;

    /// Payments of an order, oldest first.
    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<Payment>, StoreError>;

    async fn save_refund(&self, refund: &Refund) -> Result<(), StoreError>;

    /// The most recent refund of a payment.
    async fn find_refund_by_payment_id(&self, payment_id: &str) -> Result<Option<Refund>, StoreError>;
}

/// In-memory payment repository. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: MemoryTable<Payment>,
    refunds: MemoryTable<Refund>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payment_count(&self) -> Result<usize, StoreError> {
        self.payments.len()
    }

    pub fn refund_count(&self) -> Result<usize, StoreError> {
        self.refunds.len()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), StoreError> {
        self.payments.insert(payment.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, StoreError> {
        self.payments.get(id)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<Payment>, StoreError> {
        let mut payments = self.payments.find(|p| p.order_id == order_id)?;
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(payments)
    }

    async fn save_refund(&self, refund: &Refund) -> Result<(), StoreError> {
        self.refunds.insert(refund.clone())
    }

    async fn find_refund_by_payment_id(&self, payment_id: &str) -> Result<Option<Refund>, StoreError> {
        let refunds = self.refunds.find(|r| r.payment_id == payment_id)?;
        Ok(refunds.into_iter().max_by(|a, b| a.created_at.cmp(&b.created_at)))
    }
}
