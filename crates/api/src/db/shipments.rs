//! Shipment repository (thin CRUD over the `shipments` table).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use wardrobe_core::{OrderId, ShipmentId};

use super::RepositoryError;
use crate::models::Shipment;

/// Fields for a new shipment row.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub order_id: OrderId,
    pub tracking_number: String,
    pub shipped_date: DateTime<Utc>,
    pub address: String,
    pub address_code: String,
}

/// Repository for shipment database operations.
pub struct ShipmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShipmentRepository<'a> {
    /// Create a new shipment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all shipments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Shipment>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, Shipment>("SELECT * FROM shipments ORDER BY shipped_date DESC")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }

    /// Get a shipment by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shipment doesn't exist.
    pub async fn get(&self, id: ShipmentId) -> Result<Shipment, RepositoryError> {
        sqlx::query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a new shipment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewShipment) -> Result<Shipment, RepositoryError> {
        let shipment = sqlx::query_as::<_, Shipment>(
            r"
            INSERT INTO shipments (order_id, tracking_number, shipped_date, address, address_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(new.order_id)
        .bind(&new.tracking_number)
        .bind(new.shipped_date)
        .bind(&new.address)
        .bind(&new.address_code)
        .fetch_one(self.pool)
        .await?;
        Ok(shipment)
    }

    /// Update a shipment's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shipment doesn't exist.
    pub async fn update(
        &self,
        id: ShipmentId,
        tracking_number: Option<&str>,
        address: Option<&str>,
        address_code: Option<&str>,
    ) -> Result<Shipment, RepositoryError> {
        sqlx::query_as::<_, Shipment>(
            r"
            UPDATE shipments SET
                tracking_number = COALESCE($2, tracking_number),
                address = COALESCE($3, address),
                address_code = COALESCE($4, address_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(tracking_number)
        .bind(address)
        .bind(address_code)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a shipment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shipment doesn't exist.
    pub async fn delete(&self, id: ShipmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
