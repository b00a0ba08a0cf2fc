//! Order service routes.
//!
//! - `POST /checkout` with `{items, delivery_address}` returns 200 and the order
//! - `GET /orders` returns the caller's orders, newest first
//! - `GET /orders/:id` returns one order
//! - `PATCH /orders/:id/status` with `{status}` returns 204
//! - `POST /pay/:order_id` with `{payment_id}` returns 204
//! - `GET /health`
//!
//! `/checkout` and `/orders` need a resolved identity; without one they
//! answer 401 before the body is looked at.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::health;
use super::identity::{HeaderIdentity, IdentityResolver};
use crate::ids::{OrderId, UserId};
use crate::order::{Order, OrderItem, OrderService, OrderStatus};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub delivery_address: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_id: String,
}

/// State shared by the order routes.
#[derive(Clone)]
pub struct OrderApi {
    service: OrderService,
    identity: Arc<dyn IdentityResolver>,
}

impl OrderApi {
    pub fn new(service: OrderService) -> Self {
        Self {
            service,
            identity: Arc::new(HeaderIdentity::default()),
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }

    fn caller(&self, headers: &HeaderMap) -> Result<UserId, ApiError> {
        self.identity
            .resolve(headers)
            .ok_or_else(|| ApiError::Unauthorized("no authenticated user".into()))
    }
}

/// Build the order service router.
pub fn order_router(api: OrderApi) -> Router {
    Router::new()
        .route("/health", get(|| health("order-service")))
        .route("/checkout", post(checkout))
        .route("/orders", get(order_history))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_status))
        .route("/pay/:order_id", post(pay))
        .layer(TraceLayer::new_for_http())
        .with_state(api)
}

async fn checkout(
    State(api): State<OrderApi>,
    headers: HeaderMap,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let user = api.caller(&headers)?;
    let Json(request) = body?;
    let order = api
        .service
        .create_order(&user, request.items, request.delivery_address)
        .await?;
    Ok(Json(order))
}

async fn order_history(
    State(api): State<OrderApi>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user = api.caller(&headers)?;
    Ok(Json(api.service.get_order_history(&user).await?))
}

async fn get_order(
    State(api): State<OrderApi>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id: OrderId = id.parse()?;
    Ok(Json(api.service.get_order(&id).await?))
}

async fn update_status(
    State(api): State<OrderApi>,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id: OrderId = id.parse()?;
    let Json(update) = body?;
    api.service.update_order_status(&id, update.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn pay(
    State(api): State<OrderApi>,
    Path(order_id): Path<String>,
    body: Result<Json<PaymentConfirmation>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id: OrderId = order_id.parse()?;
    let Json(confirmation) = body?;
    api.service.process_payment(&id, &confirmation.payment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
