//! Account rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use wardrobe_core::{Email, Role, UserId};

/// An account.
///
/// Self-signed-up users start inactive (`is_active = false`) until the
/// emailed confirmation link is followed; seeded and admin-created users
/// start active. The Stripe customer mirror is created before the local row
/// and torn down if the local insert fails.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: UserId,
    pub stripe_customer_id: String,
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub email_validated_at: Option<DateTime<Utc>>,
    pub address: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_deleted: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Effective permission tier: the staff flag always grants admin.
    #[must_use]
    pub fn effective_role(&self) -> Role {
        if self.is_staff { Role::Admin } else { self.role }
    }
}
