//! # Order Assembly
//!
//! Turns cart lines plus catalog data into a priced [`Order`].
//!
//! ## Placement Steps (pure part)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart lines ──┐                                                         │
//! │               ├─► 0 lines?           → EmptyCart                        │
//! │  catalog ─────┤                                                         │
//! │               ├─► book missing?      → CatalogEntryMissing              │
//! │               │                                                         │
//! │               ├─► snapshot per line: title, unit price, qty,            │
//! │               │                      line_total = unit × qty            │
//! │               │                                                         │
//! │               └─► total = Σ line_total, status = NEW                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading the cart, persisting the order and clearing the cart happen in
//! `bookstore-db`, inside a single transaction around this function.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreResult, OrderError, ValidationError};
use crate::money::Money;
use crate::status::OrderStatus;
use crate::types::{CartLine, CatalogEntry, Order, OrderItem};
use crate::validation::{validate_quantity, validate_shipping_address};

/// Source of current book titles and prices.
///
/// The database layer resolves every book a cart references inside the
/// placement transaction and hands the result over as a map.
pub trait CatalogLookup {
    fn find_book(&self, book_id: &str) -> Option<CatalogEntry>;
}

impl CatalogLookup for HashMap<String, CatalogEntry> {
    fn find_book(&self, book_id: &str) -> Option<CatalogEntry> {
        self.get(book_id).cloned()
    }
}

impl<T: CatalogLookup + ?Sized> CatalogLookup for &T {
    fn find_book(&self, book_id: &str) -> Option<CatalogEntry> {
        (**self).find_book(book_id)
    }
}

/// Builds a new order from a user's cart lines.
///
/// Items keep the order of `lines`. The returned order has status `NEW`,
/// `order_date = now` and a total equal to the exact sum of its line totals.
///
/// ## Errors
/// - [`OrderError::Validation`] for a blank or oversized shipping address,
///   a non-positive quantity, or a total that overflows
/// - [`OrderError::EmptyCart`] if `lines` is empty
/// - [`OrderError::CatalogEntryMissing`] for the first line whose book does
///   not resolve
pub fn assemble_order(
    user_id: &str,
    shipping_address: &str,
    lines: &[CartLine],
    catalog: impl CatalogLookup,
    now: DateTime<Utc>,
) -> CoreResult<Order> {
    let shipping_address = validate_shipping_address(shipping_address)?;

    if lines.is_empty() {
        return Err(OrderError::EmptyCart {
            user_id: user_id.to_string(),
        });
    }

    let order_id = Uuid::new_v4().to_string();
    let mut items = Vec::with_capacity(lines.len());
    let mut total = Money::zero();

    for line in lines {
        validate_quantity(line.quantity)?;

        let entry = catalog
            .find_book(&line.book_id)
            .ok_or_else(|| OrderError::CatalogEntryMissing {
                book_id: line.book_id.clone(),
            })?;

        let line_total = entry
            .price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(total_overflow)?;
        total = total.checked_add(line_total).ok_or_else(total_overflow)?;

        items.push(OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            book_id: entry.book_id,
            title_snapshot: entry.title,
            unit_price: entry.price,
            quantity: line.quantity,
            line_total,
        });
    }

    Ok(Order {
        id: order_id,
        user_id: user_id.to_string(),
        shipping_address,
        status: OrderStatus::New,
        total,
        order_date: now,
        items,
    })
}

fn total_overflow() -> OrderError {
    OrderError::Validation(ValidationError::OutOfRange {
        field: "order total".to_string(),
        min: 0,
        max: i64::MAX,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
