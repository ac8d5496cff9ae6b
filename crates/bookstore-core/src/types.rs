//! # Domain Types
//!
//! Core domain types used throughout the bookstore.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │      Cart       │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  user_id        │   │  id (UUID)      │       │
//! │  │  isbn           │   │  lines ─────┐   │   │  status         │       │
//! │  │  title          │   └─────────────┼───┘   │  total          │       │
//! │  │  price_cents    │                 ▼       │  items ───┐     │       │
//! │  └─────────────────┘   ┌─────────────────┐   └───────────┼─────┘       │
//! │                        │    CartLine     │               ▼             │
//! │                        │  book_id, qty   │   ┌─────────────────┐       │
//! │                        └─────────────────┘   │    OrderItem    │       │
//! │                                              │  title snapshot │       │
//! │                                              │  price snapshot │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart lines point at books by id. Order items never do: they carry a copy
//! of the title and price taken when the order was placed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::status::OrderStatus;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Catalog
// =============================================================================

/// A book in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub title: String,
    pub author: String,
    /// Business identifier, unique across the catalog.
    pub isbn: String,
    /// Current list price in cents.
    pub price_cents: i64,
    pub description: Option<String>,
    /// Soft delete flag; deleted books no longer resolve in the catalog.
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog lookup result: what a book costs and what it is called right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub book_id: String,
    pub title: String,
    pub price: Money,
}

// =============================================================================
// User
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Default address offered when placing an order.
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// One (book, quantity) entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub book_id: String,
    /// Always positive.
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

/// A user's shopping cart.
///
/// ## Invariants
/// - At most one line per `book_id`
/// - Every quantity is > 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: String,
    /// Lines in the order they were first added.
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct books in the cart.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of copies across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn line_for(&self, book_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.book_id == book_id)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item in a placed order.
///
/// Snapshot pattern: title and price are frozen at placement time, so later
/// catalog edits (or deletion of the book) never change an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Book the line was taken from. Informational only; never dereferenced.
    pub book_id: String,
    /// Book title at time of order (frozen).
    pub title_snapshot: String,
    /// Unit price at time of order (frozen).
    pub unit_price: Money,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total: Money,
}

/// A placed order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub shipping_address: String,
    pub status: OrderStatus,
    /// Sum of all line totals, fixed at creation.
    pub total: Money,
    pub order_date: DateTime<Utc>,
    /// Never empty for a placed order.
    pub items: Vec<OrderItem>,
}

/// Order without its items, as shown in paginated history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub user_id: String,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub total: Money,
    pub order_date: DateTime<Utc>,
    pub item_count: i64,
}

// =============================================================================
// Pagination
// =============================================================================

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Builds a page request, rejecting sizes outside `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, size: u32) -> Result<Self, ValidationError> {
        Self::with_max_size(page, size, MAX_PAGE_SIZE)
    }

    /// Same as [`PageRequest::new`] with a configured upper bound.
    pub fn with_max_size(page: u32, size: u32, max_size: u32) -> Result<Self, ValidationError> {
        if size == 0 || size > max_size {
            return Err(ValidationError::OutOfRange {
                field: "page size".to_string(),
                min: 1,
                max: i64::from(max_size),
            });
        }
        Ok(PageRequest { page, size })
    }

    /// First page with the default size.
    pub const fn first() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::first()
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Page {
            items,
            page: request.page,
            size: request.size,
            total_items,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.size == 0 {
            return 0;
        }
        let size = i64::from(self.size);
        (self.total_items + size - 1) / size
    }

    pub fn has_next(&self) -> bool {
        i64::from(self.page) + 1 < self.total_pages()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
