//! SQLite OrderRepository implementation.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_query::{Expr, Iden, Order as SortOrder, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::model::{Order, OrderItem, OrderStatus};
use super::repository::OrderRepository;
use crate::ids::{OrderId, UserId};
use crate::store::sqlite::{from_micros, parse_decimal, to_micros};
use crate::store::{Record, StoreError};

#[derive(Iden)]
enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "total_amount"]
    TotalAmount,
    #[iden = "status"]
    Status,
    #[iden = "payment_id"]
    PaymentId,
    #[iden = "delivery_address"]
    DeliveryAddress,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
    #[iden = "deleted_at"]
    DeletedAt,
}

#[derive(Iden)]
enum OrderItems {
    Table,
    #[iden = "order_id"]
    OrderId,
    #[iden = "position"]
    Position,
    #[iden = "menu_item_id"]
    MenuItemId,
    #[iden = "name"]
    Name,
    #[iden = "quantity"]
    Quantity,
    #[iden = "price"]
    Price,
}

const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    total_amount TEXT NOT NULL,
    status TEXT NOT NULL,
    payment_id TEXT,
    delivery_address TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    deleted_at INTEGER
)"#;

const CREATE_ORDERS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_orders_user_created ON orders(user_id, created_at)";

const CREATE_ORDER_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    menu_item_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    price TEXT NOT NULL
)"#;

const CREATE_ORDER_ITEMS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id, position)";

/// SQLite implementation of [`OrderRepository`].
///
/// Orders live in `orders`, their items in `order_items` (cascade-deleted
/// with the order). Money is stored as decimal text, timestamps as
/// microseconds since the epoch.
#[derive(Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for ddl in [
            CREATE_ORDERS_TABLE,
            CREATE_ORDERS_USER_INDEX,
            CREATE_ORDER_ITEMS_TABLE,
            CREATE_ORDER_ITEMS_INDEX,
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn order_columns() -> [Orders; 9] {
        [
            Orders::Id,
            Orders::UserId,
            Orders::TotalAmount,
            Orders::Status,
            Orders::PaymentId,
            Orders::DeliveryAddress,
            Orders::CreatedAt,
            Orders::UpdatedAt,
            Orders::DeletedAt,
        ]
    }

    /// Load the items of the given orders, grouped by order id in checkout
    /// order.
    async fn load_items(&self, ids: &[String]) -> Result<HashMap<String, Vec<OrderItem>>, StoreError> {
        let mut grouped: HashMap<String, Vec<OrderItem>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }

        let query = Query::select()
            .columns([
                OrderItems::OrderId,
                OrderItems::MenuItemId,
                OrderItems::Name,
                OrderItems::Quantity,
                OrderItems::Price,
            ])
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).is_in(ids.iter().cloned()))
            .order_by(OrderItems::OrderId, SortOrder::Asc)
            .order_by(OrderItems::Position, SortOrder::Asc)
            .to_string(SqliteQueryBuilder);

        for row in sqlx::query(&query).fetch_all(&self.pool).await? {
            let order_id: String = row.try_get("order_id")?;
            let price: String = row.try_get("price")?;
            grouped.entry(order_id).or_default().push(OrderItem {
                menu_item_id: row.try_get("menu_item_id")?,
                name: row.try_get("name")?,
                quantity: row.try_get("quantity")?,
                price: parse_decimal(&price)?,
            });
        }
        Ok(grouped)
    }

    async fn hydrate(&self, rows: Vec<SqliteRow>) -> Result<Vec<Order>, StoreError> {
        let ids = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut items = self.load_items(&ids).await?;

        rows.iter()
            .map(|row| -> Result<Order, StoreError> {
                let id: String = row.try_get("id")?;
                let lines = items.remove(&id).unwrap_or_default();
                order_from_row(row, lines)
            })
            .collect()
    }
}

fn order_from_row(row: &SqliteRow, items: Vec<OrderItem>) -> Result<Order, StoreError> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let total: String = row.try_get("total_amount")?;
    let status: String = row.try_get("status")?;
    let deleted_at: Option<i64> = row.try_get("deleted_at")?;

    Ok(Order {
        id: OrderId::from_str(&id).map_err(StoreError::corrupt)?,
        user_id: UserId::new(user_id).map_err(StoreError::corrupt)?,
        items,
        total_amount: parse_decimal(&total)?,
        status: OrderStatus::from_str(&status).map_err(StoreError::corrupt)?,
        payment_id: row.try_get("payment_id")?,
        delivery_address: row.try_get("delivery_address")?,
        created_at: from_micros(row.try_get("created_at")?)?,
        updated_at: from_micros(row.try_get("updated_at")?)?,
        deleted_at: deleted_at.map(from_micros).transpose()?,
    })
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        let id = order.id.to_string();
        let insert_order = Query::insert()
            .into_table(Orders::Table)
            .columns(Self::order_columns())
            .values_panic([
                id.clone().into(),
                order.user_id.as_str().into(),
                order.total_amount.to_string().into(),
                order.status.as_str().into(),
                order.payment_id.clone().into(),
                order.delivery_address.clone().into(),
                to_micros(&order.created_at).into(),
                to_micros(&order.updated_at).into(),
                order.deleted_at.as_ref().map(to_micros).into(),
            ])
            .to_string(SqliteQueryBuilder);

        let mut tx = self.pool.begin().await?;
        sqlx::query(&insert_order).execute(&mut *tx).await?;

        for (position, item) in order.items.iter().enumerate() {
            let insert_item = Query::insert()
                .into_table(OrderItems::Table)
                .columns([
                    OrderItems::OrderId,
                    OrderItems::Position,
                    OrderItems::MenuItemId,
                    OrderItems::Name,
                    OrderItems::Quantity,
                    OrderItems::Price,
                ])
                .values_panic([
                    id.clone().into(),
                    (position as i64).into(),
                    item.menu_item_id.into(),
                    item.name.clone().into(),
                    item.quantity.into(),
                    item.price.to_string().into(),
                ])
                .to_string(SqliteQueryBuilder);
            sqlx::query(&insert_item).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let query = Query::select()
            .columns(Self::order_columns())
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id.to_string()))
            .and_where(Expr::col(Orders::DeletedAt).is_null())
            .to_string(SqliteQueryBuilder);

        let rows: Vec<SqliteRow> = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await?
            .into_iter()
            .collect();
        Ok(self.hydrate(rows).await?.pop())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let query = Query::select()
            .columns(Self::order_columns())
            .from(Orders::Table)
            .and_where(Expr::col(Orders::UserId).eq(user_id.as_str()))
            .and_where(Expr::col(Orders::DeletedAt).is_null())
            .order_by(Orders::CreatedAt, SortOrder::Desc)
            .order_by_expr(Expr::cust("rowid"), SortOrder::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let query = Query::update()
            .table(Orders::Table)
            .values([
                (Orders::Status, status.as_str().into()),
                (Orders::UpdatedAt, to_micros(&at).into()),
            ])
            .and_where(Expr::col(Orders::Id).eq(id.to_string()))
            .and_where(Expr::col(Orders::DeletedAt).is_null())
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Order::TABLE, id));
        }
        Ok(())
    }

    async fn settle(&self, id: &OrderId, payment_id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let query = Query::update()
            .table(Orders::Table)
            .values([
                (Orders::PaymentId, payment_id.into()),
                (Orders::Status, OrderStatus::Paid.as_str().into()),
                (Orders::UpdatedAt, to_micros(&at).into()),
            ])
            .and_where(Expr::col(Orders::Id).eq(id.to_string()))
            .and_where(Expr::col(Orders::Status).eq(OrderStatus::Pending.as_str()))
            .and_where(Expr::col(Orders::DeletedAt).is_null())
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let query = Query::select()
            .expr(Expr::col(Orders::Id).count())
            .from(Orders::Table)
            .and_where(Expr::col(Orders::DeletedAt).is_null())
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count as usize)
    }
}
