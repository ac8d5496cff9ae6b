//! # Cart Repository
//!
//! The Cart Store: one cart per user, at most one line per book.
//!
//! ## Claiming a Cart
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │  UPDATE carts SET updated_at = now WHERE user_id = ?   ← claim         │
//! │       │  first statement is a write: the connection takes SQLite's      │
//! │       │  write lock here, before any cart line is read                  │
//! │       ▼                                                                 │
//! │  SELECT ... FROM cart_lines WHERE user_id = ?                           │
//! │  ... modify ...                                                         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A second writer blocks on its own claim (busy timeout) until the       │
//! │  first commits, then reads the lines the first one left behind.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating cart operation and order placement starts with the claim.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::validation::{validate_cart_size, validate_quantity};
use bookstore_core::{Cart, CartLine};

use crate::error::{DbError, DbResult};
use crate::repository::book::find_book_in;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    book_id: String,
    quantity: i64,
    added_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            book_id: row.book_id,
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

/// Repository for cart operations.
///
/// Mutations return the cart as it stands after the change.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads a user's cart with lines in insertion order.
    ///
    /// Fails with `DbError::NotFound` if the user has no cart.
    pub async fn get_cart(&self, user_id: &str) -> DbResult<Cart> {
        let mut conn = self.pool.acquire().await?;
        load_cart_in(&mut conn, user_id).await
    }

    /// Adds `quantity` copies of a book, merging into an existing line.
    ///
    /// ## Errors
    /// - `DbError::Validation` if the quantity (or merged quantity) is out
    ///   of range, or a new line would exceed the cart size limit
    /// - `DbError::NotFound` if the cart or the book does not exist
    pub async fn add_item(&self, user_id: &str, book_id: &str, quantity: i64) -> DbResult<Cart> {
        validate_quantity(quantity)?;

        debug!(user_id = %user_id, book_id = %book_id, quantity, "Adding cart item");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        claim_cart_in(&mut tx, user_id, now).await?;

        if find_book_in(&mut tx, book_id).await?.is_none() {
            return Err(DbError::not_found("Book", book_id));
        }

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM cart_lines WHERE user_id = ?1 AND book_id = ?2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(current) => {
                let merged = current + quantity;
                validate_quantity(merged)?;

                sqlx::query(
                    "UPDATE cart_lines SET quantity = ?3 WHERE user_id = ?1 AND book_id = ?2",
                )
                .bind(user_id)
                .bind(book_id)
                .bind(merged)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                let lines: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines WHERE user_id = ?1")
                        .bind(user_id)
                        .fetch_one(&mut *tx)
                        .await?;
                validate_cart_size(lines as usize)?;

                sqlx::query(
                    r#"
                    INSERT INTO cart_lines (user_id, book_id, quantity, added_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                )
                .bind(user_id)
                .bind(book_id)
                .bind(quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        let cart = load_cart_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Replaces the quantity of an existing line.
    pub async fn update_quantity(
        &self,
        user_id: &str,
        book_id: &str,
        quantity: i64,
    ) -> DbResult<Cart> {
        validate_quantity(quantity)?;

        debug!(user_id = %user_id, book_id = %book_id, quantity, "Updating cart quantity");

        let mut tx = self.pool.begin().await?;
        claim_cart_in(&mut tx, user_id, Utc::now()).await?;

        let result = sqlx::query(
            "UPDATE cart_lines SET quantity = ?3 WHERE user_id = ?1 AND book_id = ?2",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", book_id));
        }

        let cart = load_cart_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Removes one line from the cart.
    pub async fn remove_item(&self, user_id: &str, book_id: &str) -> DbResult<Cart> {
        debug!(user_id = %user_id, book_id = %book_id, "Removing cart item");

        let mut tx = self.pool.begin().await?;
        claim_cart_in(&mut tx, user_id, Utc::now()).await?;

        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1 AND book_id = ?2")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", book_id));
        }

        let cart = load_cart_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Removes every line from the cart.
    pub async fn clear(&self, user_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        claim_cart_in(&mut tx, user_id, Utc::now()).await?;
        let removed = clear_in(&mut tx, user_id).await?;
        tx.commit().await?;

        debug!(user_id = %user_id, removed, "Cart cleared");
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Takes the write lock on a user's cart by touching its row.
///
/// Must be the first statement of the transaction.
pub(crate) async fn claim_cart_in(
    conn: &mut SqliteConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE carts SET updated_at = ?2 WHERE user_id = ?1")
        .bind(user_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Cart", user_id));
    }

    Ok(())
}

/// Reads the lines of a cart in insertion order.
pub(crate) async fn cart_lines_in(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> DbResult<Vec<CartLine>> {
    let rows: Vec<CartLineRow> = sqlx::query_as(
        r#"
        SELECT book_id, quantity, added_at
        FROM cart_lines
        WHERE user_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(CartLine::from).collect())
}

/// Deletes every line of a cart, returning how many were removed.
pub(crate) async fn clear_in(conn: &mut SqliteConnection, user_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

async fn load_cart_in(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Cart> {
    let updated_at: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT updated_at FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;

    let updated_at = updated_at.ok_or_else(|| DbError::not_found("Cart", user_id))?;
    let lines = cart_lines_in(conn, user_id).await?;

    Ok(Cart {
        user_id: user_id.to_string(),
        lines,
        updated_at,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{register, sample_book, test_db};
    use crate::DbError;
    use bookstore_core::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

    #[tokio::test]
    async fn test_add_item_merges_lines() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;
        let book = db.books().insert(&sample_book("Dune", 1999)).await.unwrap();

        db.carts().add_item(&user.id, &book.id, 2).await.unwrap();
        let cart = db.carts().add_item(&user.id, &book.id, 3).await.unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line_for(&book.id).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_lines_keep_insertion_order() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;
        let first = db.books().insert(&sample_book("First", 100)).await.unwrap();
        let second = db.books().insert(&sample_book("Second", 200)).await.unwrap();

        db.carts().add_item(&user.id, &second.id, 1).await.unwrap();
        db.carts().add_item(&user.id, &first.id, 1).await.unwrap();
        let cart = db.carts().add_item(&user.id, &second.id, 1).await.unwrap();

        let ids: Vec<&str> = cart.lines.iter().map(|l| l.book_id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn test_add_item_rejections() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;
        let book = db.books().insert(&sample_book("Dune", 1999)).await.unwrap();

        let result = db.carts().add_item(&user.id, &book.id, 0).await;
        assert!(matches!(result, Err(DbError::Validation(_))));

        let result = db.carts().add_item(&user.id, "no-such-book", 1).await;
        assert!(matches!(result, Err(DbError::NotFound { ref entity, .. }) if entity == "Book"));

        let result = db.carts().add_item("no-such-user", &book.id, 1).await;
        assert!(matches!(result, Err(DbError::NotFound { ref entity, .. }) if entity == "Cart"));

        db.carts().add_item(&user.id, &book.id, MAX_ITEM_QUANTITY).await.unwrap();
        let result = db.carts().add_item(&user.id, &book.id, 1).await;
        assert!(matches!(result, Err(DbError::Validation(_))));

        // Failed merge leaves the line untouched
        let cart = db.carts().get_cart(&user.id).await.unwrap();
        assert_eq!(cart.line_for(&book.id).unwrap().quantity, MAX_ITEM_QUANTITY);
    }

    #[tokio::test]
    async fn test_cart_line_limit() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;

        for i in 0..MAX_CART_ITEMS {
            let book = db
                .books()
                .insert(&sample_book(&format!("Book {}", i), 100))
                .await
                .unwrap();
            db.carts().add_item(&user.id, &book.id, 1).await.unwrap();
        }

        let extra = db.books().insert(&sample_book("One too many", 100)).await.unwrap();
        let result = db.carts().add_item(&user.id, &extra.id, 1).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;
        let book = db.books().insert(&sample_book("Dune", 1999)).await.unwrap();
        db.carts().add_item(&user.id, &book.id, 1).await.unwrap();

        let cart = db.carts().update_quantity(&user.id, &book.id, 7).await.unwrap();
        assert_eq!(cart.total_quantity(), 7);

        let cart = db.carts().remove_item(&user.id, &book.id).await.unwrap();
        assert!(cart.is_empty());

        let result = db.carts().remove_item(&user.id, &book.id).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));

        let result = db.carts().update_quantity(&user.id, &book.id, 2).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_clear() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;
        let book = db.books().insert(&sample_book("Dune", 1999)).await.unwrap();
        db.carts().add_item(&user.id, &book.id, 2).await.unwrap();

        db.carts().clear(&user.id).await.unwrap();
        assert!(db.carts().get_cart(&user.id).await.unwrap().is_empty());

        let result = db.carts().get_cart("no-such-user").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleted_book_stays_in_cart() {
        let db = test_db().await;
        let user = register(&db, "alice@example.com").await;
        let book = db.books().insert(&sample_book("Dune", 1999)).await.unwrap();
        db.carts().add_item(&user.id, &book.id, 2).await.unwrap();

        db.books().soft_delete(&book.id).await.unwrap();

        let cart = db.carts().get_cart(&user.id).await.unwrap();
        assert_eq!(cart.line_count(), 1);
    }
}
