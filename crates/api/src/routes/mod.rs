//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (verifies database)
//!
//! # Tokens
//! POST /api/token                      - Issue access + refresh tokens
//! POST /api/token/refresh              - Exchange a refresh token
//! POST /api/check-access               - Probe access (optionally admin)
//!
//! # Signup
//! POST /api/signup                     - Self-signup (inactive until confirmed)
//! POST /api/signup/confirm             - Confirm email from the mailed link
//! POST /api/signup/resend              - Resend the confirmation email
//!
//! # Products
//! GET  /api/products                   - Filtered, paginated catalog listing
//! POST /api/products                   - Create product (admin)
//! DELETE /api/products                 - Bulk soft-delete (admin)
//! GET  /api/products/{id}              - Product detail
//! PUT  /api/products/{id}              - Update product (admin)
//! DELETE /api/products/{id}            - Soft-delete product (admin)
//! POST /api/products/{id}/image        - Upload product image (admin, multipart)
//!
//! # Reviews
//! GET  /api/reviews?product_id=...     - Product reviews + average rating
//! GET  /api/products/{id}/review       - Caller's review of the product
//! POST /api/products/{id}/review       - Upsert caller's review
//! DELETE /api/products/{id}/review     - Delete caller's review
//!
//! # Orders
//! GET  /api/orders?mine=true           - List orders (all requires admin)
//! POST /api/orders                     - Create order with snapshot pricing
//! GET  /api/orders/{id}                - Order with line items
//! PUT  /api/orders/{id}                - Update status (admin, lifecycle-checked)
//! DELETE /api/orders/{id}              - Delete order (admin)
//! GET|POST /api/order-items            - Line-item CRUD
//! GET|PUT|DELETE /api/order-items/{id}
//!
//! # Per-user associations
//! GET|POST /api/favorites              - List / toggle favorites
//! GET|POST /api/wishlist               - List / toggle wishlist entries
//! GET|POST|DELETE /api/cart-items      - List / upsert / remove cart lines
//!
//! # Catalog facets
//! GET|POST /api/sizes                  - (and /api/targets, /api/clothes-types,
//! GET|PUT|DELETE /api/sizes/{id}          /api/brands; mutations admin-only)
//! GET  /api/categories                 - All four facet lists at once
//!
//! # Fulfillment
//! GET|POST /api/payments               - Payment CRUD
//! GET|PUT|DELETE /api/payments/{id}
//! GET|POST /api/shipments              - Shipment CRUD
//! GET|PUT|DELETE /api/shipments/{id}
//!
//! # Users
//! GET|POST /api/users                  - User CRUD (admin)
//! GET|PUT|DELETE /api/users/{id}
//! GET|PUT /api/profile                 - Caller's own profile
//!
//! # Checkout
//! POST /api/checkout                   - Create a Stripe Checkout Session
//! ```

pub mod attributes;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod shipments;
pub mod users;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the token and signup routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(auth::issue_token))
        .route("/token/refresh", post(auth::refresh_token))
        .route("/check-access", post(auth::check_access))
        .route("/signup", post(auth::signup))
        .route("/signup/confirm", post(auth::confirm_email))
        .route("/signup/resend", post(auth::resend_confirmation))
}

/// Create the product and review routes.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list)
                .post(products::create)
                .delete(products::bulk_delete),
        )
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/{id}/image", post(products::upload_image))
        .route(
            "/products/{id}/review",
            get(reviews::show_own)
                .post(reviews::upsert_own)
                .delete(reviews::delete_own),
        )
        .route("/reviews", get(reviews::list_for_product))
}

/// Create the order routes.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/{id}",
            get(orders::show)
                .put(orders::update_status)
                .delete(orders::delete),
        )
        .route(
            "/order-items",
            get(order_items::list).post(order_items::create),
        )
        .route(
            "/order-items/{id}",
            get(order_items::show)
                .put(order_items::update)
                .delete(order_items::delete),
        )
}

/// Create the per-user association routes.
pub fn interaction_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(favorites::list).post(favorites::toggle))
        .route("/wishlist", get(wishlist::list).post(wishlist::toggle))
        .route(
            "/cart-items",
            get(cart::list).post(cart::upsert).delete(cart::remove),
        )
}

/// Create the fulfillment routes.
pub fn fulfillment_routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(payments::list).post(payments::create))
        .route(
            "/payments/{id}",
            get(payments::show)
                .put(payments::update)
                .delete(payments::delete),
        )
        .route("/shipments", get(shipments::list).post(shipments::create))
        .route(
            "/shipments/{id}",
            get(shipments::show)
                .put(shipments::update)
                .delete(shipments::delete),
        )
}

/// Create the user management routes.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
        .route("/profile", get(users::profile).put(users::update_profile))
}

/// Create all routes for the API, nested under `/api`.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(auth_routes())
        .merge(product_routes())
        .merge(order_routes())
        .merge(interaction_routes())
        .merge(fulfillment_routes())
        .merge(user_routes())
        .merge(attributes::routes())
        .route("/checkout", post(checkout::create_session));

    Router::new().nest("/api", api)
}
