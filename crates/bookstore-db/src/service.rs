//! # Order Service
//!
//! The operations callers use: placing an order, moving it through its
//! lifecycle, and reading order history. Every method returns
//! [`OrderError`], so an adapter only has one error type to map.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  place_order(user, address)                                             │
//! │                                                                         │
//! │  validate address                         ── Validation                 │
//! │  BEGIN                                                                  │
//! │  ├── claim cart row (write lock)          ── NotFound (no cart)         │
//! │  ├── read cart lines                                                    │
//! │  ├── resolve books in catalog                                           │
//! │  ├── assemble_order (bookstore-core)      ── EmptyCart                  │
//! │  │                                        ── CatalogEntryMissing        │
//! │  ├── INSERT orders + order_items          ── Persistence                │
//! │  ├── DELETE cart_lines                                                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any early return drops the transaction, which rolls it back:          │
//! │  the cart keeps its lines and no order row survives.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use bookstore_core::validation::validate_shipping_address;
use bookstore_core::{
    assemble_order, CoreResult, Order, OrderError, OrderItem, OrderStatus, OrderSummary, Page,
    PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

use crate::error::DbError;
use crate::repository::book::catalog_entries_in;
use crate::repository::cart::{cart_lines_in, claim_cart_in, clear_in};
use crate::repository::order::{insert_in, OrderRepository};

/// Order placement, status changes and order queries.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
    orders: OrderRepository,
    default_page_size: u32,
    max_page_size: u32,
}

impl OrderService {
    /// Creates a service with the built-in page size limits.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService {
            orders: OrderRepository::new(pool.clone()),
            pool,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Overrides the page size limits (from `StoreConfig`).
    pub fn with_page_limits(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// First page at the configured default size.
    pub fn first_page(&self) -> PageRequest {
        PageRequest {
            page: 0,
            size: self.default_page_size,
        }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Turns the user's cart into a new order and empties the cart.
    ///
    /// ## Errors
    /// - `Validation` for a blank or oversized shipping address
    /// - `NotFound` if the user has no cart
    /// - `EmptyCart` if the cart has no lines
    /// - `CatalogEntryMissing` if a line's book was deleted
    /// - `Persistence` if writing the order fails; the cart is left as it was
    ///
    /// Concurrent calls for the same user are serialized by the cart claim.
    /// The second one sees the emptied cart and fails with `EmptyCart`.
    pub async fn place_order(&self, user_id: &str, shipping_address: &str) -> CoreResult<Order> {
        match self.try_place_order(user_id, shipping_address).await {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    user_id = %user_id,
                    items = order.items.len(),
                    total = %order.total,
                    "Order placed"
                );
                Ok(order)
            }
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "Order placement failed");
                Err(err)
            }
        }
    }

    async fn try_place_order(&self, user_id: &str, shipping_address: &str) -> CoreResult<Order> {
        let shipping_address = validate_shipping_address(shipping_address)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        claim_cart_in(&mut tx, user_id, now).await?;

        let lines = cart_lines_in(&mut tx, user_id).await?;
        let book_ids: Vec<&str> = lines.iter().map(|l| l.book_id.as_str()).collect();
        let catalog = catalog_entries_in(&mut tx, &book_ids).await?;

        let order = assemble_order(user_id, &shipping_address, &lines, &catalog, now)?;

        insert_in(&mut tx, &order).await?;
        clear_in(&mut tx, user_id).await?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(order)
    }

    // =========================================================================
    // Status Transitions
    // =========================================================================

    /// Moves an order to `next` if the state machine allows it.
    ///
    /// The write is a compare-and-set on the status that was read, so two
    /// racing updates cannot both apply. The loser gets `IllegalTransition`
    /// reported against the status it lost to.
    pub async fn update_status(&self, order_id: &str, next: OrderStatus) -> CoreResult<Order> {
        let order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        let from = order.status;
        if !from.can_transition_to(next) {
            warn!(order_id = %order_id, from = %from, to = %next, "Rejected status transition");
            return Err(OrderError::IllegalTransition {
                order_id: order_id.to_string(),
                from,
                to: next,
            });
        }

        if !self.orders.set_status_if(order_id, from, next).await? {
            let current = self.orders.get_by_id(order_id).await?;
            warn!(order_id = %order_id, to = %next, "Status changed concurrently");
            return Err(match current {
                Some(current) => OrderError::IllegalTransition {
                    order_id: order_id.to_string(),
                    from: current.status,
                    to: next,
                },
                None => OrderError::OrderNotFound(order_id.to_string()),
            });
        }

        info!(order_id = %order_id, from = %from, to = %next, "Order status updated");
        Ok(Order {
            status: next,
            ..order
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// A user's orders, newest first.
    pub async fn list_orders(
        &self,
        owner_id: &str,
        page: PageRequest,
    ) -> CoreResult<Page<OrderSummary>> {
        let page = self.check_page(page)?;
        Ok(self.orders.list_for_user(owner_id, page).await?)
    }

    /// All orders across users, newest first. Authorization is the caller's job.
    pub async fn list_all_orders(&self, page: PageRequest) -> CoreResult<Page<OrderSummary>> {
        let page = self.check_page(page)?;
        Ok(self.orders.list_all(page).await?)
    }

    /// A full order, if `owner_id` owns it.
    pub async fn get_order(&self, order_id: &str, owner_id: &str) -> CoreResult<Order> {
        self.orders
            .get_owned(order_id, owner_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Order", order_id))
    }

    /// The items of an order, if `owner_id` owns it.
    ///
    /// A missing order and someone else's order both give `NotFound`.
    pub async fn get_order_items(
        &self,
        order_id: &str,
        owner_id: &str,
    ) -> CoreResult<Vec<OrderItem>> {
        self.orders
            .items_owned(order_id, owner_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Order", order_id))
    }

    /// One item of an owned order.
    pub async fn get_order_item(
        &self,
        order_id: &str,
        item_id: &str,
        owner_id: &str,
    ) -> CoreResult<OrderItem> {
        self.orders
            .item_owned(order_id, item_id, owner_id)
            .await?
            .ok_or_else(|| OrderError::not_found("OrderItem", item_id))
    }

    fn check_page(&self, page: PageRequest) -> CoreResult<PageRequest> {
        Ok(PageRequest::with_max_size(
            page.page,
            page.size,
            self.max_page_size,
        )?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
