//! User repository for database operations.

use sqlx::PgPool;

use wardrobe_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;
use crate::pagination::{PAGE_SIZE, Page, PageQuery};

/// Fields for a new user row.
///
/// The Stripe customer must already exist; its id is stored for correlation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub stripe_customer_id: String,
    pub name: String,
    pub email: Email,
    pub password_hash: Option<String>,
    pub role: Role,
    pub address: String,
    pub is_active: bool,
    pub is_staff: bool,
}

/// Partial update for a user row. `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user with that id exists.
    pub async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// True when a user with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// List users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, page: PageQuery) -> Result<Page<User>, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(PAGE_SIZE)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(count, page.number(), users))
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or name is already
    /// taken, `RepositoryError::Database` otherwise.
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users
                (stripe_customer_id, name, email, password_hash, role, address,
                 is_active, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            ",
        )
        .bind(&new.stripe_customer_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.password_hash.as_deref())
        .bind(new.role)
        .bind(&new.address)
        .bind(new.is_active)
        .bind(new.is_staff)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_sqlx(e, "an account with this name or email already exists")
        })
    }

    /// Apply a partial update to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist and
    /// `RepositoryError::Conflict` on a name/email collision.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                address = COALESCE($6, address),
                is_active = COALESCE($7, is_active),
                is_staff = COALESCE($8, is_staff),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.email.as_ref())
        .bind(update.password_hash.as_deref())
        .bind(update.role)
        .bind(update.address.as_deref())
        .bind(update.is_active)
        .bind(update.is_staff)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_sqlx(e, "an account with this name or email already exists")
        })?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a user, returning the removed row (the caller tears down the
    /// Stripe customer mirror afterwards).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Mark a user's email as confirmed and activate the account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn confirm_email(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email_validated_at = NOW(), is_active = TRUE, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
