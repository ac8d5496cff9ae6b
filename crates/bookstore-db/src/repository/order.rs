//! # Order Repository
//!
//! Storage for orders and their item snapshots.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. INSERT (placement transaction only)                                │
//! │     └── insert_in() → orders row + one order_items row per line        │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── list_for_user() / get_owned() / items_owned() / item_owned()   │
//! │         every owned read filters on user_id in SQL                      │
//! │                                                                         │
//! │  3. STATUS CHANGE                                                      │
//! │     └── set_status_if() → UPDATE ... WHERE id = ? AND status = ?       │
//! │                                                                         │
//! │  Items, totals and order_date are never updated.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::{Money, Order, OrderItem, OrderStatus, OrderSummary, Page, PageRequest};

use crate::error::DbResult;

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    shipping_address: String,
    status: OrderStatus,
    total_cents: i64,
    order_date: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            shipping_address: self.shipping_address,
            status: self.status,
            total: Money::from_cents(self.total_cents),
            order_date: self.order_date,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: String,
    user_id: String,
    shipping_address: String,
    status: OrderStatus,
    total_cents: i64,
    order_date: DateTime<Utc>,
    item_count: i64,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        OrderSummary {
            id: row.id,
            user_id: row.user_id,
            shipping_address: row.shipping_address,
            status: row.status,
            total: Money::from_cents(row.total_cents),
            order_date: row.order_date,
            item_count: row.item_count,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    book_id: String,
    title_snapshot: String,
    unit_price_cents: i64,
    quantity: i64,
    line_total_cents: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            book_id: row.book_id,
            title_snapshot: row.title_snapshot,
            unit_price: Money::from_cents(row.unit_price_cents),
            quantity: row.quantity,
            line_total: Money::from_cents(row.line_total_cents),
        }
    }
}

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.shipping_address, o.status, o.total_cents, o.order_date";

const ITEM_COLUMNS: &str = "i.id, i.order_id, i.book_id, i.title_snapshot, \
     i.unit_price_cents, i.quantity, i.line_total_cents";

const SUMMARY_SELECT: &str = r#"
    SELECT o.id, o.user_id, o.shipping_address, o.status, o.total_cents, o.order_date,
           (SELECT COUNT(*) FROM order_items i WHERE i.order_id = o.id) AS item_count
    FROM orders o
"#;

// Newest first; rowid breaks ties between orders placed in the same instant.
const NEWEST_FIRST: &str = "ORDER BY o.order_date DESC, o.rowid DESC";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order reads and status changes.
///
/// Orders are only ever created inside the placement transaction, see
/// [`crate::service::OrderService::place_order`].
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its items, regardless of owner.
    pub async fn get_by_id(&self, order_id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders o WHERE o.id = ?1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let items = items_in(&mut conn, order_id).await?;
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Gets an order with its items if `owner_id` owns it.
    pub async fn get_owned(&self, order_id: &str, owner_id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders o WHERE o.id = ?1 AND o.user_id = ?2",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let items = items_in(&mut conn, order_id).await?;
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Items of an order if `owner_id` owns it; `None` otherwise.
    pub async fn items_owned(
        &self,
        order_id: &str,
        owner_id: &str,
    ) -> DbResult<Option<Vec<OrderItem>>> {
        let mut conn = self.pool.acquire().await?;

        let owned: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?1 AND user_id = ?2")
                .bind(order_id)
                .bind(owner_id)
                .fetch_optional(&mut *conn)
                .await?;

        if owned.is_none() {
            return Ok(None);
        }

        Ok(Some(items_in(&mut conn, order_id).await?))
    }

    /// One item of an order, if the order is owned by `owner_id` and the
    /// item belongs to that order.
    pub async fn item_owned(
        &self,
        order_id: &str,
        item_id: &str,
        owner_id: &str,
    ) -> DbResult<Option<OrderItem>> {
        let row: Option<OrderItemRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE i.id = ?1 AND i.order_id = ?2 AND o.user_id = ?3
            "#,
            ITEM_COLUMNS
        ))
        .bind(item_id)
        .bind(order_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrderItem::from))
    }

    /// A user's order history, newest first.
    pub async fn list_for_user(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> DbResult<Page<OrderSummary>> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<OrderSummaryRow> = sqlx::query_as(&format!(
            "{} WHERE o.user_id = ?1 {} LIMIT ?2 OFFSET ?3",
            SUMMARY_SELECT, NEWEST_FIRST
        ))
        .bind(owner_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(owner_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(OrderSummary::from).collect(),
            page,
            total,
        ))
    }

    /// Every order across all users, newest first.
    pub async fn list_all(&self, page: PageRequest) -> DbResult<Page<OrderSummary>> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<OrderSummaryRow> = sqlx::query_as(&format!(
            "{} {} LIMIT ?1 OFFSET ?2",
            SUMMARY_SELECT, NEWEST_FIRST
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(OrderSummary::from).collect(),
            page,
            total,
        ))
    }

    /// Compare-and-set on the status column.
    ///
    /// Returns `false` when the order is missing or its status is no longer
    /// `expected`.
    pub async fn set_status_if(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> DbResult<bool> {
        debug!(order_id = %order_id, from = %expected, to = %next, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?3 WHERE id = ?1 AND status = ?2")
            .bind(order_id)
            .bind(expected)
            .bind(next)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Counts all orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Writes an order and all of its items.
///
/// ## Snapshot Pattern
/// Title and unit price are copied into each item row. Nothing here refers
/// back to the books table.
pub(crate) async fn insert_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(
        order_id = %order.id,
        user_id = %order.user_id,
        items = order.items.len(),
        "Inserting order"
    );

    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, shipping_address, status, total_cents, order_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(&order.shipping_address)
    .bind(order.status)
    .bind(order.total.cents())
    .bind(order.order_date)
    .execute(&mut *conn)
    .await?;

    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, position, book_id, title_snapshot,
                unit_price_cents, quantity, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(position as i64)
        .bind(&item.book_id)
        .bind(&item.title_snapshot)
        .bind(item.unit_price.cents())
        .bind(item.quantity)
        .bind(item.line_total.cents())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn items_in(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
        "SELECT {} FROM order_items i WHERE i.order_id = ?1 ORDER BY i.position",
        ITEM_COLUMNS
    ))
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(OrderItem::from).collect())
}
