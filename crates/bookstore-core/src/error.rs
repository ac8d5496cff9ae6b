//! # Error Types
//!
//! Domain-specific error types for bookstore-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bookstore-core errors (this file)                                     │
//! │  ├── OrderError       - Closed set returned by every order operation   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bookstore-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                        (becomes OrderError::Persistence)               │
//! │                                                                         │
//! │  Flow: ValidationError → OrderError ← DbError → adapter → client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order id, book id, statuses)
//! 3. Errors are enum variants, never String
//! 4. Every variant has a stable [`ErrorKind`] for transport mapping

use serde::Serialize;
use thiserror::Error;

use crate::status::OrderStatus;

// =============================================================================
// Order Error
// =============================================================================

/// Errors returned by order placement, status updates and order queries.
///
/// This is a closed set: callers are expected to `match` exhaustively and map
/// each variant to a transport response (404, 409, 422, ...).
#[derive(Debug, Error)]
pub enum OrderError {
    /// The user's cart had no lines when an order was placed.
    ///
    /// ## User Workflow
    /// ```text
    /// place_order(user)
    ///      │
    ///      ▼
    /// Load cart: 0 lines
    ///      │
    ///      ▼
    /// EmptyCart { user_id }   (nothing written, nothing cleared)
    /// ```
    #[error("Shopping cart is empty for user {user_id}")]
    EmptyCart { user_id: String },

    /// A cart line references a book that no longer exists in the catalog.
    #[error("Book {book_id} referenced by the cart no longer exists")]
    CatalogEntryMissing { book_id: String },

    /// Status update targeted an order id that does not resolve.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The requested status change is not part of the state machine.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    IllegalTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Ownership-scoped lookup failed.
    ///
    /// Covers both "does not exist" and "belongs to someone else" so other
    /// users' orders cannot be probed.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage layer failed; the surrounding transaction was rolled back.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Caller input was rejected before any storage access.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl OrderError {
    /// Creates an ownership-scoped NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        OrderError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns the machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::EmptyCart { .. } => ErrorKind::EmptyCart,
            OrderError::CatalogEntryMissing { .. } => ErrorKind::CatalogEntryMissing,
            OrderError::OrderNotFound(_) => ErrorKind::OrderNotFound,
            OrderError::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            OrderError::NotFound { .. } => ErrorKind::NotFound,
            OrderError::Persistence(_) => ErrorKind::Persistence,
            OrderError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Stable error codes for adapters.
///
/// ## Serialization
/// ```json
/// "EMPTY_CART"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyCart,
    CatalogEntryMissing,
    OrderNotFound,
    IllegalTransition,
    NotFound,
    Persistence,
    Validation,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with OrderError.
pub type CoreResult<T> = Result<T, OrderError>;

// =============================================================================
// Unit Tests
// =============================================================================
