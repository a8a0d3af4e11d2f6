//! Shipment route handlers (thin CRUD).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::{OrderId, ShipmentId};

use crate::db::shipments::{NewShipment, ShipmentRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Shipment;
use crate::state::AppState;

/// Request body for creating a shipment.
#[derive(Debug, Deserialize)]
pub struct CreateShipmentRequest {
    pub order_id: OrderId,
    pub tracking_number: String,
    pub shipped_date: DateTime<Utc>,
    pub address: String,
    pub address_code: String,
}

/// Request body for updating a shipment.
#[derive(Debug, Deserialize)]
pub struct UpdateShipmentRequest {
    pub tracking_number: Option<String>,
    pub address: Option<String>,
    pub address_code: Option<String>,
}

/// List all shipments.
#[instrument(skip(state, _user))]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Shipment>>> {
    let repo = ShipmentRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// Shipment detail.
#[instrument(skip(state, _user))]
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ShipmentId>,
) -> Result<Json<Shipment>> {
    let repo = ShipmentRepository::new(state.pool());
    Ok(Json(repo.get(id).await?))
}

/// Create a shipment.
#[instrument(skip(state, _user, body))]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<Shipment>)> {
    let repo = ShipmentRepository::new(state.pool());
    let shipment = repo
        .create(&NewShipment {
            order_id: body.order_id,
            tracking_number: body.tracking_number,
            shipped_date: body.shipped_date,
            address: body.address,
            address_code: body.address_code,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// Update a shipment.
#[instrument(skip(state, _user, body))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ShipmentId>,
    Json(body): Json<UpdateShipmentRequest>,
) -> Result<Json<Shipment>> {
    let repo = ShipmentRepository::new(state.pool());
    let shipment = repo
        .update(
            id,
            body.tracking_number.as_deref(),
            body.address.as_deref(),
            body.address_code.as_deref(),
        )
        .await?;
    Ok(Json(shipment))
}

/// Delete a shipment.
#[instrument(skip(state, _user))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ShipmentId>,
) -> Result<StatusCode> {
    let repo = ShipmentRepository::new(state.pool());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
