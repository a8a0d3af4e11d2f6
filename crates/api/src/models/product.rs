//! Catalog product rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use wardrobe_core::{BrandId, ClothesTypeId, ProductId, SizeId, TargetId};

/// A catalog product.
///
/// Prices are integer yen. `is_deleted` soft-deletes the row; the Stripe
/// mirror is archived (never hard-deleted) alongside it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub size_id: SizeId,
    pub target_id: TargetId,
    pub clothes_type_id: ClothesTypeId,
    pub brand_id: BrandId,
    pub stripe_product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
    pub img_url: Option<String>,
    pub release_date: DateTime<Utc>,
    pub stock_quantity: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product annotated with the requesting user's favorite state.
///
/// `fav` is always false for anonymous callers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub fav: bool,
}

impl ProductView {
    /// Annotate a product for an anonymous caller.
    #[must_use]
    pub const fn anonymous(product: Product) -> Self {
        Self {
            product,
            fav: false,
        }
    }
}
