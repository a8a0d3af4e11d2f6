//! Catalog attribute facet rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A named catalog facet value.
///
/// Sizes, targets, clothes types, and brands all share this shape; the
/// repository binds the table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attribute {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
