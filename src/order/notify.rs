//! Best-effort payment notices sent after checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::Order;
use crate::bus::{Event, PublishError};
use crate::ids::{opaque_id, OrderId};

/// Queue that payment notices are sent to.
pub const PAYMENT_QUEUE: &str = "payments.requested";

/// Event type of a [`PaymentRequested`] notice.
pub const PAYMENT_REQUESTED: &str = "PaymentRequested";

/// Asks the payment side to charge an order's total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequested {
    pub order_id: OrderId,
    pub amount: Decimal,
}

impl PaymentRequested {
    pub fn for_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            amount: order.total_amount,
        }
    }

    pub fn to_event(&self) -> Result<Event, PublishError> {
        Ok(Event::json(opaque_id(), PAYMENT_REQUESTED, self)?
            .with_metadata("order_id", self.order_id.to_string()))
    }
}

#[cfg(feature = "http")]
pub use http_delivery::HttpPaymentRequests;

#[cfg(feature = "http")]
mod http_delivery {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{PaymentRequested, PAYMENT_REQUESTED};
    use crate::bus::{Deliver, DeliveryError, Event};

    /// Delivers payment notices by POSTing them to the payment service.
    ///
    /// The body is `{"order_id": ..., "amount": ...}`, which the payment
    /// service accepts as a new payment. Any non-2xx answer is a failed
    /// delivery.
    pub struct HttpPaymentRequests {
        client: reqwest::Client,
        endpoint: String,
    }

    impl HttpPaymentRequests {
        /// `base_url` is the payment service root, e.g. `http://localhost:8081`.
        pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(Self {
                client,
                endpoint: format!("{}/payments", base_url.trim_end_matches('/')),
            })
        }

        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    #[async_trait]
    impl Deliver for HttpPaymentRequests {
        async fn deliver(&self, _queue: &str, event: &Event) -> Result<(), DeliveryError> {
            if event.event_type != PAYMENT_REQUESTED {
                return Err(DeliveryError::new(format!(
                    "unexpected event type: {}",
                    event.event_type
                )));
            }
            let notice: PaymentRequested = event
                .decode()
                .map_err(|e| DeliveryError::new(format!("bad payload: {}", e)))?;

            let response = self
                .client
                .post(&self.endpoint)
                .json(&notice)
                .send()
                .await
                .map_err(|e| DeliveryError::new(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DeliveryError::new(format!(
                    "payment service answered {} for order {}",
                    status, notice.order_id
                )));
            }
            tracing::info!(order_id = %notice.order_id, amount = %notice.amount, "payment requested");
            Ok(())
        }
    }

}
