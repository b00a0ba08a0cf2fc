//! SQLite PaymentRepository implementation.

use std::str::FromStr;

use async_trait::async_trait;
use sea_query::{Expr, Iden, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::model::{Payment, PaymentStatus, Refund, RefundStatus};
use super::repository::PaymentRepository;
use crate::store::sqlite::{from_micros, parse_decimal, to_micros};
use crate::store::StoreError;

#[derive(Iden)]
enum Payments {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "order_id"]
    OrderId,
    #[iden = "amount"]
    Amount,
    #[iden = "status"]
    Status,
    #[iden = "transaction_id"]
    TransactionId,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
enum Refunds {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "payment_id"]
    PaymentId,
    #[iden = "status"]
    Status,
    #[iden = "amount"]
    Amount,
    #[iden = "created_at"]
    CreatedAt,
}

const CREATE_PAYMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    order_id TEXT NOT NULL,
    amount TEXT NOT NULL,
    status TEXT NOT NULL,
    transaction_id TEXT NOT NULL,
    created_at INTEGER NOT NULL
)"#;

const CREATE_PAYMENTS_ORDER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_payments_order ON payments(order_id, created_at)";

const CREATE_REFUNDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS refunds (
    id TEXT PRIMARY KEY,
    payment_id TEXT NOT NULL REFERENCES payments(id),
    status TEXT NOT NULL,
    amount TEXT NOT NULL,
    created_at INTEGER NOT NULL
)"#;

const CREATE_REFUNDS_PAYMENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_refunds_payment ON refunds(payment_id, created_at)";

/// SQLite implementation of [`PaymentRepository`].
#[derive(Clone)]
pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for ddl in [
            CREATE_PAYMENTS_TABLE,
            CREATE_PAYMENTS_ORDER_INDEX,
            CREATE_REFUNDS_TABLE,
            CREATE_REFUNDS_PAYMENT_INDEX,
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }
}

const PAYMENT_COLUMNS: [Payments; 6] = [
    Payments::Id,
    Payments::OrderId,
    Payments::Amount,
    Payments::Status,
    Payments::TransactionId,
    Payments::CreatedAt,
];

const REFUND_COLUMNS: [Refunds; 5] = [
    Refunds::Id,
    Refunds::PaymentId,
    Refunds::Status,
    Refunds::Amount,
    Refunds::CreatedAt,
];

fn payment_from_row(row: &SqliteRow) -> Result<Payment, StoreError> {
    let amount: String = row.try_get("amount")?;
    let status: String = row.try_get("status")?;
    Ok(Payment {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        amount: parse_decimal(&amount)?,
        status: PaymentStatus::from_str(&status).map_err(StoreError::corrupt)?,
        transaction_id: row.try_get("transaction_id")?,
        created_at: from_micros(row.try_get("created_at")?)?,
    })
}

fn refund_from_row(row: &SqliteRow) -> Result<Refund, StoreError> {
    let amount: String = row.try_get("amount")?;
    let status: String = row.try_get("status")?;
    Ok(Refund {
        id: row.try_get("id")?,
        payment_id: row.try_get("payment_id")?,
        status: RefundStatus::from_str(&status).map_err(StoreError::corrupt)?,
        amount: parse_decimal(&amount)?,
        created_at: from_micros(row.try_get("created_at")?)?,
    })
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), StoreError> {
        let query = Query::insert()
            .into_table(Payments::Table)
            .columns(PAYMENT_COLUMNS)
            .values_panic([
                payment.id.clone().into(),
                payment.order_id.clone().into(),
                payment.amount.to_string().into(),
                payment.status.as_str().into(),
                payment.transaction_id.clone().into(),
                to_micros(&payment.created_at).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, StoreError> {
        let query = Query::select()
            .columns(PAYMENT_COLUMNS)
            .from(Payments::Table)
            .and_where(Expr::col(Payments::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(payment_from_row)
            .transpose()
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<Payment>, StoreError> {
        let query = Query::select()
            .columns(PAYMENT_COLUMNS)
            .from(Payments::Table)
            .and_where(Expr::col(Payments::OrderId).eq(order_id))
            .order_by(Payments::CreatedAt, Order::Asc)
            .order_by_expr(Expr::cust("rowid"), Order::Asc)
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(payment_from_row)
            .collect()
    }

    async fn save_refund(&self, refund: &Refund) -> Result<(), StoreError> {
        let query = Query::insert()
            .into_table(Refunds::Table)
            .columns(REFUND_COLUMNS)
            .values_panic([
                refund.id.clone().into(),
                refund.payment_id.clone().into(),
                refund.status.as_str().into(),
                refund.amount.to_string().into(),
                to_micros(&refund.created_at).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_refund_by_payment_id(&self, payment_id: &str) -> Result<Option<Refund>, StoreError> {
        let query = Query::select()
            .columns(REFUND_COLUMNS)
            .from(Refunds::Table)
            .and_where(Expr::col(Refunds::PaymentId).eq(payment_id))
            .order_by(Refunds::CreatedAt, Order::Desc)
            .order_by_expr(Expr::cust("rowid"), Order::Desc)
            .limit(1)
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(refund_from_row)
            .transpose()
    }
}
