//! Order rows with snapshot pricing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use wardrobe_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// An order.
///
/// `total_price` is computed once at creation from the line-item snapshots
/// and never recomputed, even if items or product prices change later.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item.
///
/// `unit_price` is the product's price captured at order creation, decoupled
/// from the product's live price.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order together with its line items, as returned by detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
