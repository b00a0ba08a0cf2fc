//! Payment service binary: payment records and refunds over HTTP, backed by
//! SQLite, charging through the dummy gateway.

use std::sync::Arc;

use orderpay::http::{self, payment_router};
use orderpay::payment::{DummyGateway, PaymentService, SqlitePaymentRepository};
use orderpay::store::sqlite;
use orderpay::telemetry::init_tracing;
use orderpay::Settings;

const DEFAULT_DATABASE_URL: &str = "sqlite://payments.db";
const DEFAULT_PORT: u16 = 8081;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_from(Settings {
        port: DEFAULT_PORT,
        ..Settings::default()
    })?;
    init_tracing(&settings.log_filter);

    let database_url = settings.database_url_or(DEFAULT_DATABASE_URL);
    let pool = sqlite::connect(&database_url, settings.store_timeout()).await?;
    let repo = SqlitePaymentRepository::new(pool);
    repo.init_schema().await?;

    let service = PaymentService::new(Arc::new(repo), Arc::new(DummyGateway))
        .with_store_timeout(settings.store_timeout());

    tracing::info!(database = %database_url, "payment service starting");
    http::serve(payment_router(service), &settings.bind_addr()).await?;
    Ok(())
}
