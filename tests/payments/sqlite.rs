//! PaymentService over SQLite.

use std::sync::Arc;
use std::time::Duration;

use orderpay::payment::{NewPayment, PaymentService, RefundStatus, SqlitePaymentRepository};
use orderpay::store::sqlite::connect;
use orderpay::ServiceError;
use rust_decimal::Decimal;

use crate::support::{service_over, FixedGateway};

async fn service() -> PaymentService {
    let pool = connect("sqlite::memory:", Duration::from_secs(1)).await.unwrap();
    let repo = SqlitePaymentRepository::new(pool);
    repo.init_schema().await.unwrap();
    service_over(Arc::new(repo), FixedGateway("tx1"))
}

#[tokio::test]
async fn payments_round_trip() {
    let service = service().await;
    let payment = service
        .create_payment(NewPayment::new("o-1", Decimal::new(1999, 2)))
        .await
        .unwrap();

    let stored = service.get_payment(&payment.id).await.unwrap();
    assert_eq!(stored.amount, Decimal::new(1999, 2));
    assert_eq!(stored.transaction_id, "tx1");
    assert_eq!(stored.created_at.timestamp_micros(), payment.created_at.timestamp_micros());

    assert!(matches!(
        service.get_payment("missing").await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn listing_is_oldest_first() {
    let service = service().await;
    let mut ids = Vec::new();
    for amount in [1, 2, 3] {
        let payment = service
            .create_payment(NewPayment::new("o-1", Decimal::from(amount)))
            .await
            .unwrap();
        ids.push(payment.id);
    }
    service
        .create_payment(NewPayment::new("o-2", Decimal::ONE))
        .await
        .unwrap();

    let listed: Vec<String> = service
        .list_payments_by_order("o-1")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn latest_refund_wins() {
    let service = service().await;
    let payment = service
        .create_payment(NewPayment::new("o-1", Decimal::TEN))
        .await
        .unwrap();

    service.initiate_refund(&payment.id).await.unwrap();
    let latest = service.initiate_refund(&payment.id).await.unwrap();

    let stored = service.get_refund_status(&payment.id).await.unwrap();
    assert_eq!(stored.id, latest.id);
    assert_eq!(stored.status, RefundStatus::Initiated);
    assert_eq!(stored.amount, Decimal::TEN);
}

#[tokio::test]
async fn unknown_payment_gets_no_refund() {
    let service = service().await;
    assert!(matches!(
        service.initiate_refund("missing").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.get_refund_status("missing").await,
        Err(ServiceError::NotFound(_))
    ));
}
