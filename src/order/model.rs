//! Order entity and its checkout rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::ids::{OrderId, UserId};
use crate::store::Record;

/// Lifecycle status of an order.
///
/// No transition table is enforced: [`update_order_status`] may replace any
/// status with any other. Only settlement is gated (it requires `Pending`).
///
/// [`update_order_status`]: super::OrderService::update_order_status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Preparing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// One line of a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: i64,
    #[serde(default)]
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn new(menu_item_id: i64, quantity: i32, price: Decimal) -> Self {
        Self {
            menu_item_id,
            name: String::new(),
            quantity,
            price,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// quantity × price, `None` when it does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

/// A checked-out order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Turn a cart into a new `Pending` order.
    ///
    /// The cart must hold at least one item, every quantity must be positive
    /// and no price may be negative. The total is always computed here;
    /// nothing the client sends is trusted for it.
    pub fn checkout(
        user_id: UserId,
        items: Vec<OrderItem>,
        delivery_address: String,
        now: DateTime<Utc>,
    ) -> Result<Self, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::validation("order must contain at least one item"));
        }
        for (idx, item) in items.iter().enumerate() {
            if item.quantity <= 0 {
                return Err(ServiceError::validation(format!(
                    "item {}: quantity must be positive, got {}",
                    idx, item.quantity
                )));
            }
            if item.price.is_sign_negative() && !item.price.is_zero() {
                return Err(ServiceError::validation(format!(
                    "item {}: price must not be negative, got {}",
                    idx, item.price
                )));
            }
        }

        let total_amount = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
            .ok_or_else(|| ServiceError::validation("order total overflows"))?;

        Ok(Self {
            id: OrderId::generate(),
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            payment_id: None,
            delivery_address,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Record the payment reference and mark the order paid.
    /// Returns false, leaving the order untouched, unless it is `Pending`.
    pub fn settle(&mut self, payment_id: &str, at: DateTime<Utc>) -> bool {
        if self.status != OrderStatus::Pending {
            return false;
        }
        self.payment_id = Some(payment_id.to_string());
        self.status = OrderStatus::Paid;
        self.updated_at = at;
        true
    }

    pub fn set_status(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

impl Record for Order {
    const TABLE: &'static str = "orders";

    fn key(&self) -> String {
        self.id.to_string()
    }
}
