//! Shared fixtures for the payment tests.

use std::sync::Arc;

use async_trait::async_trait;
use orderpay::payment::{
    DummyGateway, GatewayError, InMemoryPaymentRepository, PaymentGateway, PaymentRepository,
    PaymentService,
};
use rust_decimal::Decimal;

/// Always answers with the same transaction reference.
pub struct FixedGateway(pub &'static str);

#[async_trait]
impl PaymentGateway for FixedGateway {
    async fn process(&self, _amount: Decimal) -> Result<String, GatewayError> {
        Ok(self.0.to_string())
    }
}

/// Refuses every charge.
pub struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn process(&self, _amount: Decimal) -> Result<String, GatewayError> {
        Err(GatewayError::Rejected("card declined".into()))
    }
}

pub fn service_over(repo: Arc<dyn PaymentRepository>, gateway: impl PaymentGateway + 'static) -> PaymentService {
    PaymentService::new(repo, Arc::new(gateway))
}

pub fn in_memory_service() -> (PaymentService, InMemoryPaymentRepository) {
    let repo = InMemoryPaymentRepository::new();
    (service_over(Arc::new(repo.clone()), DummyGateway), repo)
}
