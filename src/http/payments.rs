//! Payment service routes.
//!
//! - `POST /payments` with `{id?, order_id, amount}` returns 201 and the payment
//! - `GET /payments?order_id=` lists an order's payments
//! - `GET /payments/:id`
//! - `POST /payments/:id/refund` starts a full refund
//! - `GET /payments/:id/refund` returns the latest refund
//! - `POST /payments/webhook` accepts provider notifications
//! - `GET /health`

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::health;
use crate::error::ServiceError;
use crate::payment::{NewPayment, Payment, PaymentService, Refund};

#[derive(Debug, Deserialize)]
pub struct PaymentFilter {
    pub order_id: Option<String>,
}

/// Build the payment service router.
pub fn payment_router(service: PaymentService) -> Router {
    Router::new()
        .route("/health", get(|| health("payment-service")))
        .route("/payments", post(create_payment).get(list_payments))
        .route("/payments/webhook", post(webhook))
        .route("/payments/:id", get(get_payment))
        .route("/payments/:id/refund", post(initiate_refund).get(refund_status))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn create_payment(
    State(service): State<PaymentService>,
    body: Result<Json<NewPayment>, JsonRejection>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let Json(request) = body?;
    let payment = service.create_payment(request).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn list_payments(
    State(service): State<PaymentService>,
    filter: Result<Query<PaymentFilter>, QueryRejection>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let Query(filter) = filter?;
    let order_id = filter
        .order_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::Validation("order_id query parameter is required".into()))?;
    Ok(Json(service.list_payments_by_order(&order_id).await?))
}

async fn get_payment(
    State(service): State<PaymentService>,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(service.get_payment(&id).await?))
}

async fn initiate_refund(
    State(service): State<PaymentService>,
    Path(id): Path<String>,
) -> Result<Json<Refund>, ApiError> {
    Ok(Json(service.initiate_refund(&id).await?))
}

async fn refund_status(
    State(service): State<PaymentService>,
    Path(id): Path<String>,
) -> Result<Json<Refund>, ApiError> {
    Ok(Json(service.get_refund_status(&id).await?))
}

async fn webhook(
    State(service): State<PaymentService>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    service.handle_webhook(&body).await?;
    Ok(Json(json!({ "ok": true })))
}
