//! Payment and shipment rows attached to orders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use wardrobe_core::{OrderId, PaymentId, ShipmentId};

/// A payment record for an order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub payment_date: DateTime<Utc>,
    pub payment_option: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A shipment record for an order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub tracking_number: String,
    pub shipped_date: DateTime<Utc>,
    pub address: String,
    pub address_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
