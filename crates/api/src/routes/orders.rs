//! Order route handlers.
//!
//! Creation snapshots unit prices and the total once; listing is scoped to
//! the caller unless they hold the admin tier; status updates go through the
//! order lifecycle table.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::{OrderId, OrderStatus, ProductId};

use crate::db::orders::{OrderLineRequest, OrderRepository, StatusUpdateError};
use crate::error::{ApiError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, OrderWithItems};
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;

/// Order listing query parameters.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// Restrict to the caller's own orders. Listing everyone's orders
    /// requires the admin tier.
    pub mine: Option<bool>,
    pub page: Option<u32>,
}

/// One requested line of a new order.
#[derive(Debug, Deserialize)]
pub struct OrderLineBody {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineBody>,
}

/// Request body for a status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

impl From<StatusUpdateError> for ApiError {
    fn from(e: StatusUpdateError) -> Self {
        match e {
            StatusUpdateError::Repository(repo) => Self::Database(repo),
            StatusUpdateError::Lifecycle(lifecycle) => Self::Validation(lifecycle.to_string()),
        }
    }
}

/// List orders, newest first. `mine=true` scopes to the caller; the
/// unscoped listing requires the admin tier.
#[instrument(skip(state, user))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Page<Order>>> {
    let owner = if query.mine.unwrap_or(false) {
        Some(user.id)
    } else {
        if !user.is_admin() {
            return Err(ApiError::Forbidden(
                "listing all orders requires administrator access".into(),
            ));
        }
        None
    };

    let repo = OrderRepository::new(state.pool());
    let page = repo.list(owner, PageQuery { page: query.page }).await?;
    Ok(Json(page))
}

/// Create an order from the requested lines.
#[instrument(skip(state, user, body))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    if body.items.is_empty() {
        return Err(ApiError::Validation("items must not be empty".into()));
    }
    if body.items.iter().any(|line| line.quantity < 1) {
        return Err(ApiError::Validation(
            "every line quantity must be at least 1".into(),
        ));
    }

    let lines: Vec<OrderLineRequest> = body
        .items
        .iter()
        .map(|line| OrderLineRequest {
            product_id: line.product_id,
            quantity: line.quantity,
        })
        .collect();

    let repo = OrderRepository::new(state.pool());
    let order = repo.create(user.id, &lines).await.map_err(|e| match e {
        crate::db::RepositoryError::NotFound => {
            ApiError::NotFound("order references a product that does not exist".into())
        }
        other => ApiError::Database(other),
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Order detail with line items, visible to its owner and to admins.
#[instrument(skip(state, user))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo.get_with_items(id).await?;

    if order.order.user_id != user.id && !user.is_admin() {
        return Err(ApiError::Forbidden(
            "orders are only visible to their owner".into(),
        ));
    }

    Ok(Json(order))
}

/// Update an order's status (admin), enforcing the lifecycle.
#[instrument(skip(state, body))]
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|_| ApiError::Validation("invalid status value provided".into()))?;

    let repo = OrderRepository::new(state.pool());
    let order = repo.update_status(id, status).await?;
    Ok(Json(order))
}

/// Delete an order (admin).
#[instrument(skip(state))]
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    let repo = OrderRepository::new(state.pool());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
