//! # bookstore-db: Persistence and Order Service
//!
//! SQLite storage for the bookstore and the [`OrderService`] that runs the
//! pure order logic from `bookstore-core` inside database transactions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookstore Data Flow                              │
//! │                                                                         │
//! │  Transport adapter (place order, list history, ship, cancel)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bookstore-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ OrderService  │───►│ BookRepo      │    │ migrations/  │  │   │
//! │  │   │ place_order   │    │ UserRepo      │    │ sqlite/      │  │   │
//! │  │   │ update_status │    │ CartRepo      │    │ 001_init.sql │  │   │
//! │  │   │ list / get    │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                        SqlitePool (WAL)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bookstore.db                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (book, user, cart, order)
//! - [`service`] - Order placement, status transitions and order queries
//! - [`config`] - TOML + environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookstore_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bookstore.db")).await?;
//!
//! db.carts().add_item(&user_id, &book_id, 2).await?;
//! let order = db.order_service().place_order(&user_id, "1 Main St").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::OrderService;

// Repository re-exports for convenience
pub use repository::book::BookRepository;
pub use repository::cart::CartRepository;
pub use repository::order::OrderRepository;
pub use repository::user::{NewUser, UserRepository};
