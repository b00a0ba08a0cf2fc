//! PaymentService behaviour over the in-memory repository.

use std::sync::Arc;

use orderpay::payment::{
    GatewayError, InMemoryPaymentRepository, NewPayment, PaymentStatus, RefundStatus,
};
use orderpay::ServiceError;
use rust_decimal::Decimal;

use crate::support::{in_memory_service, service_over, DecliningGateway, FixedGateway};

#[tokio::test]
async fn payment_scenario() {
    let repo = InMemoryPaymentRepository::new();
    let service = service_over(Arc::new(repo.clone()), FixedGateway("tx1"));

    let payment = service
        .create_payment(NewPayment::new("order-1", Decimal::from(100)))
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.transaction_id, "tx1");
    assert_eq!(payment.order_id, "order-1");

    let err = service
        .create_payment(NewPayment::new("order-1", Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Gateway(GatewayError::InvalidAmount(_))));
    assert_eq!(err.status_code(), 500);
    assert_eq!(repo.payment_count().unwrap(), 1);
}

#[tokio::test]
async fn declined_payments_are_not_recorded() {
    let repo = InMemoryPaymentRepository::new();
    let service = service_over(Arc::new(repo.clone()), DecliningGateway);

    let err = service
        .create_payment(NewPayment::new("order-1", Decimal::ONE))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Gateway(GatewayError::Rejected(_))));
    assert_eq!(repo.payment_count().unwrap(), 0);
}

#[tokio::test]
async fn missing_order_id_is_a_validation_error() {
    let (service, _) = in_memory_service();
    let err = service
        .create_payment(NewPayment::new(" ", Decimal::ONE))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn payments_are_listed_per_order_oldest_first() {
    let (service, _) = in_memory_service();
    let first = service
        .create_payment(NewPayment::new("o-1", Decimal::ONE))
        .await
        .unwrap();
    service
        .create_payment(NewPayment::new("o-2", Decimal::ONE))
        .await
        .unwrap();
    let second = service
        .create_payment(NewPayment::new("o-1", Decimal::TWO))
        .await
        .unwrap();

    let listed = service.list_payments_by_order("o-1").await.unwrap();
    assert_eq!(listed, vec![first, second]);
    assert!(service.list_payments_by_order("o-3").await.unwrap().is_empty());
}

#[tokio::test]
async fn refund_lifecycle() {
    let (service, repo) = in_memory_service();

    assert!(matches!(
        service.initiate_refund("unknown").await,
        Err(ServiceError::NotFound(_))
    ));
    assert_eq!(repo.refund_count().unwrap(), 0);

    let payment = service
        .create_payment(NewPayment::new("o-1", Decimal::new(1550, 2)).with_id("pay-1"))
        .await
        .unwrap();
    assert!(matches!(
        service.get_refund_status("pay-1").await,
        Err(ServiceError::NotFound(_))
    ));

    let first = service.initiate_refund(&payment.id).await.unwrap();
    assert_eq!(first.status, RefundStatus::Initiated);
    assert_eq!(first.amount, Decimal::new(1550, 2));
    assert_eq!(first.payment_id, "pay-1");

    let second = service.initiate_refund(&payment.id).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(service.get_refund_status("pay-1").await.unwrap(), second);
}

#[tokio::test]
async fn webhooks_are_accepted() {
    let (service, _) = in_memory_service();
    service.handle_webhook(b"{\"event\":\"charge.succeeded\"}").await.unwrap();
    service.handle_webhook(b"").await.unwrap();
}
