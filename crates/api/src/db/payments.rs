//! Payment repository (thin CRUD over the `payments` table).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use wardrobe_core::{OrderId, PaymentId};

use super::RepositoryError;
use crate::models::Payment;

/// Fields for a new payment row.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub payment_date: DateTime<Utc>,
    pub payment_option: String,
    pub payment_status: String,
}

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Payment>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY payment_date DESC")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }

    /// Get a payment by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    pub async fn get(&self, id: PaymentId) -> Result<Payment, RepositoryError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a new payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewPayment) -> Result<Payment, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(
            r"
            INSERT INTO payments (order_id, payment_date, payment_option, payment_status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(new.order_id)
        .bind(new.payment_date)
        .bind(&new.payment_option)
        .bind(&new.payment_status)
        .fetch_one(self.pool)
        .await?;
        Ok(payment)
    }

    /// Update a payment's option and/or status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    pub async fn update(
        &self,
        id: PaymentId,
        payment_option: Option<&str>,
        payment_status: Option<&str>,
    ) -> Result<Payment, RepositoryError> {
        sqlx::query_as::<_, Payment>(
            r"
            UPDATE payments SET
                payment_option = COALESCE($2, payment_option),
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(payment_option)
        .bind(payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    pub async fn delete(&self, id: PaymentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
