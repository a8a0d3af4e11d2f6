//! Order line-item route handlers.
//!
//! Raw CRUD over line items. Editing items never recomputes the parent
//! order's stored total: the total is a creation-time snapshot.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::{OrderId, OrderItemId, ProductId};

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::OrderItem;
use crate::state::AppState;

/// Request body for creating a line item.
#[derive(Debug, Deserialize)]
pub struct CreateOrderItemRequest {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: i64,
}

/// Request body for updating a line item.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderItemRequest {
    pub quantity: Option<i32>,
    pub unit_price: Option<i64>,
}

/// List all line items.
#[instrument(skip(state, _user))]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderItem>>> {
    let repo = OrderRepository::new(state.pool());
    let items = repo.list_items().await?;
    Ok(Json(items))
}

/// Line-item detail.
#[instrument(skip(state, _user))]
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderItemId>,
) -> Result<Json<OrderItem>> {
    let repo = OrderRepository::new(state.pool());
    let item = repo.get_item(id).await?;
    Ok(Json(item))
}

/// Create a line item with an explicit price snapshot.
#[instrument(skip(state, _user, body))]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderItemRequest>,
) -> Result<(StatusCode, Json<OrderItem>)> {
    let repo = OrderRepository::new(state.pool());
    let item = repo
        .create_item(body.order_id, body.product_id, body.quantity, body.unit_price)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a line item's quantity and/or snapshot price.
#[instrument(skip(state, _user, body))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderItemId>,
    Json(body): Json<UpdateOrderItemRequest>,
) -> Result<Json<OrderItem>> {
    let repo = OrderRepository::new(state.pool());
    let item = repo.update_item(id, body.quantity, body.unit_price).await?;
    Ok(Json(item))
}

/// Delete a line item.
#[instrument(skip(state, _user))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderItemId>,
) -> Result<StatusCode> {
    let repo = OrderRepository::new(state.pool());
    repo.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
