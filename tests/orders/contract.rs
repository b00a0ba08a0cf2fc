//! Behaviour every OrderRepository backend must share.

use std::sync::Arc;

use chrono::{Duration, Utc};
use orderpay::order::{Order, OrderRepository, OrderStatus};
use orderpay::{OrderId, StoreError};

use crate::support::{cart, pizza, user};

fn checkout_at(user_id: &str, at: chrono::DateTime<Utc>) -> Order {
    Order::checkout(user(user_id), cart(), "A".into(), at).unwrap()
}

pub async fn round_trip(repo: Arc<dyn OrderRepository>) {
    let order = Order::checkout(user("u"), vec![pizza(2), pizza(1)], "12 Main St".into(), Utc::now()).unwrap();
    repo.create(&order).await.unwrap();

    let stored = repo.get(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.id, order.id);
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.total_amount, order.total_amount);
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.payment_id, None);
    assert_eq!(stored.delivery_address, "12 Main St");
    assert_eq!(repo.get(&OrderId::generate()).await.unwrap(), None);
    assert_eq!(repo.count().await.unwrap(), 1);
}

pub async fn history_is_newest_first(repo: Arc<dyn OrderRepository>) {
    let t0 = Utc::now();
    let oldest = checkout_at("u", t0 - Duration::minutes(10));
    let first_tie = checkout_at("u", t0);
    let second_tie = checkout_at("u", t0);
    let stranger = checkout_at("v", t0 + Duration::minutes(1));

    for order in [&first_tie, &oldest, &stranger, &second_tie] {
        repo.create(order).await.unwrap();
    }

    let ids: Vec<OrderId> = repo
        .list_by_user(&user("u"))
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![second_tie.id, first_tie.id, oldest.id]);
    assert!(repo.list_by_user(&user("nobody")).await.unwrap().is_empty());
}

pub async fn update_status_overwrites_anything(repo: Arc<dyn OrderRepository>) {
    let order = checkout_at("u", Utc::now());
    repo.create(&order).await.unwrap();

    for status in [OrderStatus::Delivered, OrderStatus::Pending, OrderStatus::Cancelled] {
        repo.update_status(&order.id, status, Utc::now()).await.unwrap();
        assert_eq!(repo.get(&order.id).await.unwrap().unwrap().status, status);
    }

    let missing = repo
        .update_status(&OrderId::generate(), OrderStatus::Paid, Utc::now())
        .await;
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));
}

pub async fn settle_happens_once(repo: Arc<dyn OrderRepository>) {
    let order = checkout_at("u", Utc::now());
    repo.create(&order).await.unwrap();

    assert!(repo.settle(&order.id, "pay_1", Utc::now()).await.unwrap());
    assert!(!repo.settle(&order.id, "pay_2", Utc::now()).await.unwrap());

    let stored = repo.get(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.payment_id.as_deref(), Some("pay_1"));
    assert!(stored.updated_at >= stored.created_at);
}

pub async fn settle_requires_pending(repo: Arc<dyn OrderRepository>) {
    let order = checkout_at("u", Utc::now());
    repo.create(&order).await.unwrap();
    repo.update_status(&order.id, OrderStatus::Cancelled, Utc::now())
        .await
        .unwrap();

    assert!(!repo.settle(&order.id, "pay_1", Utc::now()).await.unwrap());
    assert_eq!(repo.get(&order.id).await.unwrap().unwrap().payment_id, None);
}

mod in_memory {
    use crate::support::in_memory;

    #[tokio::test]
    async fn round_trip() {
        super::round_trip(in_memory()).await;
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        super::history_is_newest_first(in_memory()).await;
    }

    #[tokio::test]
    async fn update_status_overwrites_anything() {
        super::update_status_overwrites_anything(in_memory()).await;
    }

    #[tokio::test]
    async fn settle_happens_once() {
        super::settle_happens_once(in_memory()).await;
    }

    #[tokio::test]
    async fn settle_requires_pending() {
        super::settle_requires_pending(in_memory()).await;
    }
}
