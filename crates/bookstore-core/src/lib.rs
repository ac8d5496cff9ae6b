//! # bookstore-core: Pure Order Logic for the Bookstore
//!
//! This crate holds the rules that turn a shopping cart into a priced,
//! immutable order and govern what may happen to that order afterwards.
//! Everything here is a pure function over plain values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bookstore Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Transport adapter (HTTP, CLI) - not in this repo       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            bookstore-db: OrderService + repositories             │   │
//! │  │     place_order, update_status, list_orders, get_order_items     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ bookstore-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │  status   │  │   │
//! │  │   │ Cart      │  │   Money   │  │ snapshot  │  │ NEW→...   │  │   │
//! │  │   │ Order     │  │           │  │ assembly  │  │ guard     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Cart, Order, OrderItem, Page, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - Cart → order snapshot assembly
//! - [`status`] - Order status state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bookstore_core::money::Money;
//!
//! let unit_price = Money::from_cents(2000); // $20.00
//! let line_total = unit_price.checked_multiply_quantity(2);
//! assert_eq!(line_total, Some(Money::from_cents(4000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreResult, ErrorKind, OrderError, ValidationError};
pub use money::Money;
pub use order::{assemble_order, CatalogLookup};
pub use status::OrderStatus;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct book lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single book in a cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a shipping address.
pub const MAX_SHIPPING_ADDRESS_LEN: usize = 255;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on any page size a caller can request.
pub const MAX_PAGE_SIZE: u32 = 100;
