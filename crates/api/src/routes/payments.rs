//! Payment route handlers (thin CRUD).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::{OrderId, PaymentId};

use crate::db::payments::{NewPayment, PaymentRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Payment;
use crate::state::AppState;

/// Request body for creating a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: OrderId,
    pub payment_date: DateTime<Utc>,
    pub payment_option: String,
    pub payment_status: String,
}

/// Request body for updating a payment.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_option: Option<String>,
    pub payment_status: Option<String>,
}

/// List all payments.
#[instrument(skip(state, _user))]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Payment>>> {
    let repo = PaymentRepository::new(state.pool());
    Ok(Json(repo.list().await?))
}

/// Payment detail.
#[instrument(skip(state, _user))]
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<Json<Payment>> {
    let repo = PaymentRepository::new(state.pool());
    Ok(Json(repo.get(id).await?))
}

/// Create a payment.
#[instrument(skip(state, _user, body))]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>)> {
    let repo = PaymentRepository::new(state.pool());
    let payment = repo
        .create(&NewPayment {
            order_id: body.order_id,
            payment_date: body.payment_date,
            payment_option: body.payment_option,
            payment_status: body.payment_status,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Update a payment.
#[instrument(skip(state, _user, body))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
    Json(body): Json<UpdatePaymentRequest>,
) -> Result<Json<Payment>> {
    let repo = PaymentRepository::new(state.pool());
    let payment = repo
        .update(
            id,
            body.payment_option.as_deref(),
            body.payment_status.as_deref(),
        )
        .await?;
    Ok(Json(payment))
}

/// Delete a payment.
#[instrument(skip(state, _user))]
pub async fn delete(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<StatusCode> {
    let repo = PaymentRepository::new(state.pool());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
