//! # Repository Module
//!
//! Database repository implementations for the bookstore.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderService / adapter                                                │
//! │       │                                                                 │
//! │       │  db.carts().add_item(user, book, 2)                            │
//! │       ▼                                                                 │
//! │  CartRepository                     pool-level methods: one unit of     │
//! │  ├── get_cart(&self, user)          work each, own transaction when     │
//! │  ├── add_item(&self, ...)           they write more than one row        │
//! │  └── ...                                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  *_in(conn, ...) helpers            run on a caller's transaction;      │
//! │                                     the placement transaction is built  │
//! │                                     from these                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BookRepository`](book::BookRepository) - Catalog and Catalog Lookup
//! - [`UserRepository`](user::UserRepository) - Registration (user + cart)
//! - [`CartRepository`](cart::CartRepository) - Cart Store
//! - [`OrderRepository`](order::OrderRepository) - Order reads and status CAS

pub mod book;
pub mod cart;
pub mod order;
pub mod user;
