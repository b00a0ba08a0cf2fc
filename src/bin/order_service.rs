//! Order service binary.
//!
//! Checkout, order history, status changes and settlement over HTTP, backed
//! by SQLite. Payment notices are delivered to the payment service in the
//! background.

use std::sync::Arc;

use orderpay::bus::ChannelSender;
use orderpay::http::{self, order_router, HeaderIdentity, OrderApi};
use orderpay::order::{HttpPaymentRequests, OrderService, SqliteOrderRepository};
use orderpay::store::sqlite;
use orderpay::telemetry::init_tracing;
use orderpay::Settings;

const DEFAULT_DATABASE_URL: &str = "sqlite://orders.db";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_tracing(&settings.log_filter);

    let database_url = settings.database_url_or(DEFAULT_DATABASE_URL);
    let pool = sqlite::connect(&database_url, settings.store_timeout()).await?;
    let repo = SqliteOrderRepository::new(pool);
    repo.init_schema().await?;

    let delivery = HttpPaymentRequests::new(&settings.payment_service_url, settings.notify_timeout())?;
    tracing::info!(endpoint = delivery.endpoint(), "payment notices enabled");
    let (notices, _dispatch) = ChannelSender::spawn(delivery, settings.notify_queue_capacity);

    let service = OrderService::new(Arc::new(repo))
        .with_store_timeout(settings.store_timeout())
        .with_payment_notices(Arc::new(notices));
    let api = OrderApi::new(service).with_identity(Arc::new(HeaderIdentity::new(&settings.identity_header)?));

    tracing::info!(database = %database_url, "order service starting");
    http::serve(order_router(api), &settings.bind_addr()).await?;
    Ok(())
}
