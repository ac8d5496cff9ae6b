//! Shared fixtures for database tests.

use chrono::Utc;
use uuid::Uuid;

use bookstore_core::{Book, User};

use crate::repository::book::generate_book_id;
use crate::{Database, DbConfig, NewUser};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub fn sample_book(title: &str, price_cents: i64) -> Book {
    let now = Utc::now();
    Book {
        id: generate_book_id(),
        title: title.to_string(),
        author: "Test Author".to_string(),
        isbn: format!("isbn-{}", Uuid::new_v4().simple()),
        price_cents,
        description: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        shipping_address: Some("1 Main St".to_string()),
    }
}

pub async fn register(db: &Database, email: &str) -> User {
    db.users().register(&new_user(email)).await.unwrap()
}

/// Inserts one book per `(title, price_cents, quantity)` and adds it to the
/// user's cart. Returns the books in the same order.
pub async fn fill_cart(db: &Database, user_id: &str, lines: &[(&str, i64, i64)]) -> Vec<Book> {
    let mut books = Vec::with_capacity(lines.len());
    for (title, price_cents, quantity) in lines {
        let book = db.books().insert(&sample_book(title, *price_cents)).await.unwrap();
        db.carts().add_item(user_id, &book.id, *quantity).await.unwrap();
        books.push(book);
    }
    books
}
