//! Row types mapped from the database.
//!
//! Every struct here derives `sqlx::FromRow` for the repository layer and
//! `Serialize` for the JSON surface; write-only columns (password hashes)
//! are skipped during serialization.

pub mod attributes;
pub mod fulfillment;
pub mod interaction;
pub mod order;
pub mod product;
pub mod user;

pub use attributes::Attribute;
pub use fulfillment::{Payment, Shipment};
pub use interaction::{CartItem, Favorite, Review, WishlistEntry};
pub use order::{Order, OrderItem, OrderWithItems};
pub use product::{Product, ProductView};
pub use user::User;
