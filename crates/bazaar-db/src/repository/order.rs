//! # Order Repository
//!
//! Database operations for vendor sub-orders and their items.
//!
//! ## Batch Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_batch([Order(V1), Order(V2), Order(V3)])                        │
//! │                                                                         │
//! │   BEGIN ─ INSERT orders ─ INSERT order_items ×n ─ COMMIT   ✓ Order(V1)  │
//! │   BEGIN ─ INSERT orders ─ INSERT order_items ×n ─ COMMIT   ✓ Order(V2)  │
//! │   BEGIN ─ INSERT orders ─ ✗ failure ─ ROLLBACK             ✗ Order(V3)  │
//! │                                                                         │
//! │  → DbError::PartialBatch { persisted: 2, total: 3 }                     │
//! │                                                                         │
//! │  Each order is atomic with its items. There is no transaction spanning │
//! │  the batch: V1 and V2 stay committed.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};
use bazaar_core::{Address, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, vendor_id, amount_cents, subtotal_cents, \
     street, city, zip, status, created_at, updated_at";

// =============================================================================
// Row Types
// =============================================================================

/// Flat `orders` row; items and address are reassembled afterwards.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    vendor_id: String,
    amount_cents: i64,
    subtotal_cents: i64,
    street: String,
    city: String,
    zip: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: String,
    product_id: String,
    vendor_id: String,
    quantity: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            vendor_id: self.vendor_id,
            items,
            amount_cents: self.amount_cents,
            subtotal_cents: self.subtotal_cents,
            address: Address {
                street: self.street,
                city: self.city,
                zip: self.zip,
            },
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts one order and its items in a single transaction.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, vendor_id = %order.vendor_id, items = order.items.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;
        write_order(&mut tx, order).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Persists every order of a checkout, one transaction per order.
    ///
    /// ## Returns
    /// * `Ok(orders)` - all orders committed, in input order
    /// * `Err(e)` - the first order failed; nothing was written
    /// * `Err(DbError::PartialBatch)` - a later order failed; earlier ones stay
    pub async fn insert_batch(&self, orders: &[Order]) -> DbResult<Vec<Order>> {
        let total = orders.len();

        for (persisted, order) in orders.iter().enumerate() {
            if let Err(err) = self.insert(order).await {
                if persisted == 0 {
                    return Err(err);
                }
                error!(
                    persisted,
                    total,
                    failed_order = %order.id,
                    error = %err,
                    "Order batch stopped after partial write"
                );
                return Err(DbError::PartialBatch {
                    persisted,
                    total,
                    reason: err.to_string(),
                });
            }
        }

        info!(count = total, "Order batch persisted");
        Ok(orders.to_vec())
    }

    /// Gets an order with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = ?1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Lists every order, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders ORDER BY created_at, rowid",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Lists orders created at or after `since`, oldest first.
    pub async fn list_since(&self, since: DateTime<Utc>) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE created_at >= ?1 ORDER BY created_at, rowid",
            ORDER_COLUMNS
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Lists the orders placed by one user, oldest first.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at, rowid",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Writes status, address and `updated_at` back. Items and totals are
    /// immutable once the order exists.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn update(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, status = ?order.status, "Updating order");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                street = ?3,
                city = ?4,
                zip = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&order.id)
        .bind(order.status)
        .bind(&order.address.street)
        .bind(&order.address.city)
        .bind(&order.address.zip)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        Ok(())
    }

    /// Deletes an order; its items go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Counts stored orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Loads the items of every row in one query and builds the orders,
    /// preserving row order and item position.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT order_id, product_id, vendor_id, quantity FROM order_items WHERE order_id IN (",
        );
        let mut separated = query.separated(", ");
        for row in &rows {
            separated.push_bind(row.id.clone());
        }
        separated.push_unseparated(") ORDER BY order_id, position");

        let item_rows = query
            .build_query_as::<OrderItemRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem {
                    product_id: item.product_id,
                    vendor_id: item.vendor_id,
                    quantity: item.quantity,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}

/// Writes the order row and its items on an open transaction.
async fn write_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, user_id, vendor_id, amount_cents, subtotal_cents,
            street, city, zip, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(&order.vendor_id)
    .bind(order.amount_cents)
    .bind(order.subtotal_cents)
    .bind(&order.address.street)
    .bind(&order.address.city)
    .bind(&order.address.zip)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, position, product_id, vendor_id, quantity)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(position as i64)
        .bind(&item.product_id)
        .bind(&item.vendor_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
