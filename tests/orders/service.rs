//! OrderService behaviour over the in-memory repository.

use std::sync::Arc;
use std::time::Duration;

use orderpay::bus::{Event, InMemoryQueue, PublishError, Sender};
use orderpay::order::{
    InMemoryOrderRepository, OrderItem, OrderRepository, OrderService, OrderStatus, PaymentRequested,
    PAYMENT_QUEUE,
};
use orderpay::{OrderId, ServiceError};
use rust_decimal::Decimal;

use crate::support::{cart, in_memory, pizza, user, SlowRepository};

/// A sender whose queue is always closed.
struct ClosedQueue;

impl Sender for ClosedQueue {
    fn send(&self, queue: &str, _event: Event) -> Result<(), PublishError> {
        Err(PublishError::Closed(queue.to_string()))
    }
}

/// A sender whose worker has fallen behind.
struct FullQueue;

impl Sender for FullQueue {
    fn send(&self, queue: &str, _event: Event) -> Result<(), PublishError> {
        Err(PublishError::Full(queue.to_string()))
    }
}

#[tokio::test]
async fn checkout_scenario() {
    let service = OrderService::new(in_memory());

    let order = service
        .create_order(&user("u"), vec![OrderItem::new(1, 2, Decimal::TEN)], "A".into())
        .await
        .unwrap();
    assert_eq!(order.total_amount, Decimal::from(20));
    assert_eq!(order.status, OrderStatus::Pending);

    let fetched = service.get_order(&order.id).await.unwrap();
    assert_eq!(fetched, order);

    service.process_payment(&order.id, "pay_1").await.unwrap();
    let paid = service.get_order(&order.id).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.payment_id.as_deref(), Some("pay_1"));

    let err = service.process_payment(&order.id, "pay_2").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn totals_are_exact() {
    let service = OrderService::new(in_memory());
    let items = vec![
        OrderItem::new(1, 3, Decimal::new(10, 2)),
        OrderItem::new(2, 7, Decimal::new(333, 2)),
        OrderItem::new(3, 1, Decimal::new(1, 2)),
    ];

    let order = service.create_order(&user("u"), items, "A".into()).await.unwrap();
    // 0.30 + 23.31 + 0.01
    assert_eq!(order.total_amount, Decimal::new(2362, 2));
}

#[tokio::test]
async fn invalid_carts_never_reach_the_store() {
    let repo = Arc::new(InMemoryOrderRepository::new());
    let service = OrderService::new(repo.clone());

    for items in [
        vec![],
        vec![pizza(0)],
        vec![pizza(1), OrderItem::new(2, 1, Decimal::new(-5, 1))],
    ] {
        let err = service.create_order(&user("u"), items, "A".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
    }
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn empty_payment_id_is_rejected_in_any_state() {
    let service = OrderService::new(in_memory());
    let order = service.create_order(&user("u"), cart(), "A".into()).await.unwrap();

    assert!(matches!(
        service.process_payment(&order.id, "").await,
        Err(ServiceError::Validation(_))
    ));

    service.process_payment(&order.id, "pay_1").await.unwrap();
    assert!(matches!(
        service.process_payment(&order.id, "").await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn paying_an_unknown_order_is_not_found() {
    let service = OrderService::new(in_memory());
    let err = service
        .process_payment(&OrderId::generate(), "pay_1")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn status_updates_are_unrestricted() {
    let service = OrderService::new(in_memory());
    let order = service.create_order(&user("u"), cart(), "A".into()).await.unwrap();

    service
        .update_order_status(&order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    service
        .update_order_status(&order.id, OrderStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(
        service.get_order(&order.id).await.unwrap().status,
        OrderStatus::Preparing
    );

    // settlement is still gated on Pending
    assert!(matches!(
        service.process_payment(&order.id, "pay_1").await,
        Err(ServiceError::InvalidState(_))
    ));

    let missing = service
        .update_order_status(&OrderId::generate(), OrderStatus::Paid)
        .await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn history_of_a_new_user_is_empty() {
    let service = OrderService::new(in_memory());
    service.create_order(&user("someone"), cart(), "A".into()).await.unwrap();

    assert!(service.get_order_history(&user("new")).await.unwrap().is_empty());
    assert_eq!(service.get_order_history(&user("someone")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_settlements_have_one_winner() {
    let service = OrderService::new(in_memory());
    let order = service.create_order(&user("u"), cart(), "A".into()).await.unwrap();

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            let id = order.id;
            tokio::spawn(async move { service.process_payment(&id, &format!("pay_{i}")).await })
        })
        .collect();

    let mut winners = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => winners += 1,
            Err(ServiceError::InvalidState(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn checkout_does_not_depend_on_the_notice() {
    let queue = InMemoryQueue::new();
    let notified = OrderService::new(in_memory()).with_payment_notices(Arc::new(queue.clone()));
    let broken = OrderService::new(in_memory()).with_payment_notices(Arc::new(ClosedQueue));
    let backed_up = OrderService::new(in_memory()).with_payment_notices(Arc::new(FullQueue));

    let a = notified.create_order(&user("u"), cart(), "A".into()).await.unwrap();
    let b = broken.create_order(&user("u"), cart(), "A".into()).await.unwrap();
    let c = backed_up.create_order(&user("u"), cart(), "A".into()).await.unwrap();
    assert_eq!(a.total_amount, b.total_amount);
    assert_eq!(a.status, b.status);
    assert_eq!(a.total_amount, c.total_amount);
    assert_eq!(a.status, c.status);

    let events = queue.sent_to(PAYMENT_QUEUE);
    assert_eq!(events.len(), 1);
    let notice: PaymentRequested = events[0].decode().unwrap();
    assert_eq!(notice.order_id, a.id);
    assert_eq!(notice.amount, Decimal::from(20));
}

#[tokio::test]
async fn slow_store_surfaces_as_storage_error() {
    let repo = Arc::new(SlowRepository {
        inner: InMemoryOrderRepository::new(),
        delay: Duration::from_millis(200),
    });
    let service = OrderService::new(repo.clone()).with_store_timeout(Duration::from_millis(20));

    let err = service.create_order(&user("u"), cart(), "A".into()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Storage(ref msg) if msg.contains("timed out")));
    assert_eq!(err.status_code(), 500);

    let err = service.get_order_history(&user("u")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Storage(_)));
}
