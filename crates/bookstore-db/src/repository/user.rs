//! # User Repository
//!
//! Registration creates the user row and its (empty) cart together, so every
//! registered user can place orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use bookstore_core::{User, ValidationError};

use crate::error::DbResult;

/// Input for [`UserRepository::register`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    shipping_address: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
        }
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a user and creates their empty cart in one transaction.
    ///
    /// ## Errors
    /// - `DbError::Validation` if the email is blank
    /// - `DbError::UniqueViolation` if the email is already registered
    pub async fn register(&self, new_user: &NewUser) -> DbResult<User> {
        let email = new_user.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::Required {
                field: "email".to_string(),
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            shipping_address: new_user.shipping_address.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %user.id, email = %user.email, "Registering user");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, shipping_address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.shipping_address)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO carts (user_id, updated_at) VALUES (?1, ?2)")
            .bind(&user.id)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %user.id, "User registered");
        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, first_name, last_name, shipping_address, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Gets a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, first_name, last_name, shipping_address, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_user, test_db};
    use crate::DbError;

    #[tokio::test]
    async fn test_register_creates_empty_cart() {
        let db = test_db().await;
        let user = db.users().register(&new_user("alice@example.com")).await.unwrap();

        let cart = db.carts().get_cart(&user.id).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.user_id, user.id);
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_email() {
        let db = test_db().await;
        let user = db.users().register(&new_user("Bob@Example.com")).await.unwrap();
        assert_eq!(user.email, "bob@example.com");

        let by_id = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "bob@example.com");

        let by_email = db.users().get_by_email("BOB@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(db.users().get_by_id("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        db.users().register(&new_user("carol@example.com")).await.unwrap();

        let result = db.users().register(&new_user("carol@example.com")).await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_blank_email_rejected() {
        let db = test_db().await;
        let result = db.users().register(&new_user("   ")).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }
}
