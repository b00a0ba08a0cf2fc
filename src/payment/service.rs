//! Payment service: gateway calls, payment records and refunds.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use super::gateway::{GatewayError, PaymentGateway};
use super::model::{NewPayment, Payment, PaymentStatus, Refund, RefundStatus};
use super::repository::PaymentRepository;
use super::webhook::{IgnoreNotifications, NotificationHandler};
use crate::error::ServiceError;
use crate::ids::opaque_id;
use crate::store::{bounded, Record, StoreError, DEFAULT_STORE_TIMEOUT};

#[derive(Clone)]
pub struct PaymentService {
    repo: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    notifications: Arc<dyn NotificationHandler>,
    store_timeout: Duration,
}

impl PaymentService {
    pub fn new(repo: Arc<dyn PaymentRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            repo,
            gateway,
            notifications: Arc::new(IgnoreNotifications),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_notification_handler(mut self, handler: Arc<dyn NotificationHandler>) -> Self {
        self.notifications = handler;
        self
    }

    pub fn with_store_timeout(mut self, limit: Duration) -> Self {
        self.store_timeout = limit;
        self
    }

    /// Charge `amount` through the gateway and record the payment.
    ///
    /// Nothing is stored when the amount is not positive or the gateway
    /// refuses.
    pub async fn create_payment(&self, request: NewPayment) -> Result<Payment, ServiceError> {
        let order_id = request.order_id.trim();
        if order_id.is_empty() {
            return Err(ServiceError::validation("order id must not be empty"));
        }
        if request.amount <= Decimal::ZERO {
            return Err(GatewayError::InvalidAmount(request.amount).into());
        }

        let transaction_id = self.gateway.process(request.amount).await.map_err(|e| {
            tracing::warn!(order_id, amount = %request.amount, error = %e, "gateway refused payment");
            e
        })?;

        let payment = Payment {
            id: request
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(opaque_id),
            order_id: order_id.to_string(),
            amount: request.amount,
            status: PaymentStatus::Completed,
            transaction_id,
            created_at: Utc::now(),
        };

        bounded(self.store_timeout, "payments.save", self.repo.save(&payment)).await?;
        tracing::info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            amount = %payment.amount,
            transaction_id = %payment.transaction_id,
            "payment completed"
        );
        Ok(payment)
    }

    pub async fn get_payment(&self, id: &str) -> Result<Payment, ServiceError> {
        bounded(self.store_timeout, "payments.find_by_id", self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| StoreError::not_found(Payment::TABLE, id).into())
    }

    /// Payments recorded for an order, oldest first.
    pub async fn list_payments_by_order(&self, order_id: &str) -> Result<Vec<Payment>, ServiceError> {
        Ok(bounded(
            self.store_timeout,
            "payments.find_by_order_id",
            self.repo.find_by_order_id(order_id),
        )
        .await?)
    }

    /// Start a refund of the whole payment. No partial refunds.
    ///
    /// A payment that cannot be read, for whatever reason, is `NotFound`.
    pub async fn initiate_refund(&self, payment_id: &str) -> Result<Refund, ServiceError> {
        let lookup = bounded(self.store_timeout, "payments.find_by_id", self.repo.find_by_id(payment_id));
        let payment = match lookup.await {
            Ok(Some(payment)) => payment,
            Ok(None) => return Err(StoreError::not_found(Payment::TABLE, payment_id).into()),
            Err(e) => {
                tracing::warn!(payment_id, error = %e, "payment lookup failed, refund refused");
                return Err(StoreError::not_found(Payment::TABLE, payment_id).into());
            }
        };

        let refund = Refund {
            id: opaque_id(),
            payment_id: payment.id,
            status: RefundStatus::Initiated,
            amount: payment.amount,
            created_at: Utc::now(),
        };
        bounded(self.store_timeout, "refunds.save", self.repo.save_refund(&refund)).await?;
        tracing::info!(refund_id = %refund.id, payment_id = %refund.payment_id, amount = %refund.amount, "refund initiated");
        Ok(refund)
    }

    /// The latest refund of a payment.
    pub async fn get_refund_status(&self, payment_id: &str) -> Result<Refund, ServiceError> {
        bounded(
            self.store_timeout,
            "refunds.find_by_payment_id",
            self.repo.find_refund_by_payment_id(payment_id),
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("refund for payment {}", payment_id)))
    }

    pub async fn handle_webhook(&self, body: &[u8]) -> Result<(), ServiceError> {
        self.notifications.handle_notification(body).await
    }
}
