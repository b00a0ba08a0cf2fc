//! HTTP transport for both services.
//!
//! Requires the `http` feature. Uses axum for routing and tower-http for
//! request tracing. Handlers decode, call the service and map
//! [`ServiceError`](crate::ServiceError) kinds to status codes through
//! [`ApiError`]; malformed bodies are 400, never axum's default 422.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orderpay::http::{self, order_router, OrderApi};
//! use orderpay::order::{InMemoryOrderRepository, OrderService};
//!
//! let service = OrderService::new(Arc::new(InMemoryOrderRepository::new()));
//! http::serve(order_router(OrderApi::new(service)), "0.0.0.0:8080").await?;
//! ```

mod error;
mod identity;
mod orders;
mod payments;

use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;

pub use error::ApiError;
pub use identity::{HeaderIdentity, IdentityResolver, DEFAULT_IDENTITY_HEADER};
pub use orders::{order_router, CheckoutRequest, OrderApi, PaymentConfirmation, StatusUpdate};
pub use payments::{payment_router, PaymentFilter};

/// Serve a router at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve(app: Router, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await
}

/// `GET /health` returns `{ "ok": true, "service": <name> }`.
async fn health(service: &'static str) -> impl IntoResponse {
    Json(json!({ "ok": true, "service": service }))
}
