//! Order repository: creation with snapshot pricing, scoped listing, and
//! lifecycle-checked status updates.

use sqlx::PgPool;

use wardrobe_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderWithItems};
use crate::pagination::{PAGE_SIZE, Page, PageQuery};

/// A requested order line: the unit price is captured from the product at
/// creation time, never from the request.
#[derive(Debug, Clone, Copy)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Error from a status update: either the row is gone or the lifecycle
/// forbids the move.
#[derive(Debug, thiserror::Error)]
pub enum StatusUpdateError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Lifecycle(#[from] wardrobe_core::OrderStatusError),
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order for `user_id` from the requested lines.
    ///
    /// Runs in a single transaction: each product's current price is read
    /// and snapshotted into its line's `unit_price`, and the order total is
    /// computed once as the sum of `quantity x unit_price`. Later price or
    /// item changes never touch the stored total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if any referenced product does
    /// not exist, `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        user_id: UserId,
        lines: &[OrderLineRequest],
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut snapshots = Vec::with_capacity(lines.len());
        let mut total_price: i64 = 0;
        for line in lines {
            let unit_price: i64 =
                sqlx::query_scalar("SELECT price FROM products WHERE id = $1")
                    .bind(line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
            total_price += unit_price * i64::from(line.quantity);
            snapshots.push((line.product_id, line.quantity, unit_price));
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (user_id, status, total_price)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(OrderStatus::Pending)
        .bind(total_price)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(snapshots.len());
        for (product_id, quantity, unit_price) in snapshots {
            let item = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                ",
            )
            .bind(order.id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;

        Ok(OrderWithItems { order, items })
    }

    /// List orders, newest first, optionally restricted to one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        owner: Option<UserId>,
        page: PageQuery,
    ) -> Result<Page<Order>, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE ($1::int IS NULL OR user_id = $1)",
        )
        .bind(owner.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT * FROM orders
            WHERE ($1::int IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(owner.map(|id| id.as_i32()))
        .bind(PAGE_SIZE)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(count, page.number(), orders))
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn get_with_items(&self, id: OrderId) -> Result<OrderWithItems, RepositoryError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(OrderWithItems { order, items })
    }

    /// Move an order to `new_status`, holding a row lock while the lifecycle
    /// check runs so concurrent updates serialize.
    ///
    /// # Errors
    ///
    /// Returns `StatusUpdateError::Repository` for missing rows or database
    /// failures, `StatusUpdateError::Lifecycle` when the transition is not
    /// allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, StatusUpdateError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(RepositoryError::from)?
                .ok_or(RepositoryError::NotFound)?;

        let next = current.transition_to(new_status)?;

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(order)
    }

    /// Hard-delete an order (line items cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Line items
    // =========================================================================

    /// List all line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_items(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// Get a line item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn get_item(&self, id: OrderItemId) -> Result<OrderItem, RepositoryError> {
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a line item as given. The parent order's stored total is
    /// deliberately left untouched (snapshot semantics).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: i64,
    ) -> Result<OrderItem, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(self.pool)
        .await?;
        Ok(item)
    }

    /// Update a line item's quantity and/or unit price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn update_item(
        &self,
        id: OrderItemId,
        quantity: Option<i32>,
        unit_price: Option<i64>,
    ) -> Result<OrderItem, RepositoryError> {
        sqlx::query_as::<_, OrderItem>(
            r"
            UPDATE order_items SET
                quantity = COALESCE($2, quantity),
                unit_price = COALESCE($3, unit_price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a line item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn delete_item(&self, id: OrderItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
