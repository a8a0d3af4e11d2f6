//! Per-user product association rows: cart, favorites, wishlist, reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use wardrobe_core::{CartItemId, FavoriteId, ProductId, ReviewId, UserId, WishlistEntryId};

/// A cart line.
///
/// At most one row per (user, product); re-adding updates the quantity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A favorite. Row presence alone encodes the relationship.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A wishlist entry: a favorite with a visibility flag.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product review.
///
/// Unique per (user, product); a second submission updates the existing row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
