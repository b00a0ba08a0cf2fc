//! Payment gateway capability.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::ids::opaque_id;

/// Error from a payment provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("payment rejected: {0}")]
    Rejected(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Authorizes and settles an amount, returning the provider's transaction
/// reference.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn process(&self, amount: Decimal) -> Result<String, GatewayError>;
}

/// Stand-in provider: accepts every positive amount.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyGateway;

#[async_trait]
impl PaymentGateway for DummyGateway {
    async fn process(&self, amount: Decimal) -> Result<String, GatewayError> {
        if amount <= Decimal::ZERO {
            return Err(GatewayError::InvalidAmount(amount));
        }
        Ok(format!("dummy-{}", opaque_id()))
    }
}
