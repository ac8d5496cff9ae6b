//! # Book Repository
//!
//! Catalog storage, and the Catalog Lookup used by order placement.
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  books.is_deleted = 0   → find_book() returns the entry                 │
//! │  books.is_deleted = 1   → find_book() returns None                      │
//! │                                                                         │
//! │  cart_lines keep pointing at the id, so placing an order for a cart     │
//! │  that still holds a deleted book fails with CatalogEntryMissing.        │
//! │  order_items never point back here; they carry their own snapshot.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use bookstore_core::validation::{validate_price_cents, validate_title};
use bookstore_core::{Book, CatalogEntry};

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: String,
    title: String,
    author: String,
    isbn: String,
    price_cents: i64,
    description: Option<String>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            price_cents: row.price_cents,
            description: row.description,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    title: String,
    price_cents: i64,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        CatalogEntry {
            book_id: row.id,
            title: row.title,
            price: bookstore_core::Money::from_cents(row.price_cents),
        }
    }
}

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.books();
/// let book = repo.insert(&book).await?;
/// let entry = repo.find_book(&book.id).await?; // Some(CatalogEntry)
/// ```
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Inserts a new book.
    ///
    /// ## Errors
    /// - `DbError::Validation` for a blank title or negative price
    /// - `DbError::UniqueViolation` for a duplicate id or ISBN
    pub async fn insert(&self, book: &Book) -> DbResult<Book> {
        validate_title(&book.title)?;
        validate_price_cents(book.price_cents)?;

        debug!(id = %book.id, isbn = %book.isbn, "Inserting book");

        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, author, isbn, price_cents, description,
                is_deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.price_cents)
        .bind(&book.description)
        .bind(book.is_deleted)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(book.clone())
    }

    /// Gets a book by ID, including soft-deleted books.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let row: Option<BookRow> = sqlx::query_as(
            r#"
            SELECT id, title, author, isbn, price_cents, description,
                   is_deleted, created_at, updated_at
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    /// Catalog Lookup: current title and price of an active book.
    pub async fn find_book(&self, id: &str) -> DbResult<Option<CatalogEntry>> {
        let mut conn = self.pool.acquire().await?;
        find_book_in(&mut conn, id).await
    }

    /// Changes the list price. Existing orders keep their snapshot.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        validate_price_cents(price_cents)?;

        debug!(id = %id, price_cents, "Updating book price");

        let result = sqlx::query(
            r#"
            UPDATE books
            SET price_cents = ?2, updated_at = ?3
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .bind(price_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    /// Soft-deletes a book. Lookups report it as missing afterwards.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting book");

        let result = sqlx::query(
            r#"
            UPDATE books
            SET is_deleted = 1, updated_at = ?2
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    /// Counts active books (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE is_deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Looks up one active book on an existing connection or transaction.
pub(crate) async fn find_book_in(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<CatalogEntry>> {
    let row: Option<CatalogRow> = sqlx::query_as(
        "SELECT id, title, price_cents FROM books WHERE id = ?1 AND is_deleted = 0",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(CatalogEntry::from))
}

/// Resolves every id that is still in the catalog. Missing ids are absent
/// from the map.
pub(crate) async fn catalog_entries_in(
    conn: &mut SqliteConnection,
    ids: &[&str],
) -> DbResult<HashMap<String, CatalogEntry>> {
    let mut entries = HashMap::new();
    for &id in ids {
        if let Some(entry) = find_book_in(&mut *conn, id).await? {
            entries.insert(entry.book_id.clone(), entry);
        }
    }
    Ok(entries)
}

/// Helper to generate a new book ID.
pub fn generate_book_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{sample_book, test_db};
    use crate::DbError;
    use bookstore_core::Money;

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = test_db().await;
        let book = db.books().insert(&sample_book("Dune", 1999)).await.unwrap();

        let entry = db.books().find_book(&book.id).await.unwrap().unwrap();
        assert_eq!(entry.title, "Dune");
        assert_eq!(entry.price, Money::from_cents(1999));

        let stored = db.books().get_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(stored.isbn, book.isbn);
        assert!(!stored.is_deleted);
        assert_eq!(db.books().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_book() {
        let db = test_db().await;

        let result = db.books().insert(&sample_book("", 100)).await;
        assert!(matches!(result, Err(DbError::Validation(_))));

        let result = db.books().insert(&sample_book("Negative", -1)).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_isbn() {
        let db = test_db().await;
        let first = db.books().insert(&sample_book("One", 100)).await.unwrap();

        let mut second = sample_book("Two", 200);
        second.isbn = first.isbn.clone();
        let result = db.books().insert(&second).await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_lookup() {
        let db = test_db().await;
        let book = db.books().insert(&sample_book("Gone", 500)).await.unwrap();

        db.books().soft_delete(&book.id).await.unwrap();

        assert!(db.books().find_book(&book.id).await.unwrap().is_none());
        assert!(db.books().get_by_id(&book.id).await.unwrap().unwrap().is_deleted);
        assert_eq!(db.books().count().await.unwrap(), 0);

        // Second delete finds nothing active
        let result = db.books().soft_delete(&book.id).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_price() {
        let db = test_db().await;
        let book = db.books().insert(&sample_book("Priced", 500)).await.unwrap();

        db.books().update_price(&book.id, 750).await.unwrap();
        let entry = db.books().find_book(&book.id).await.unwrap().unwrap();
        assert_eq!(entry.price, Money::from_cents(750));

        let result = db.books().update_price("missing", 750).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }
}
