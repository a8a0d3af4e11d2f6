//! User roles with an explicit permission ranking.

use serde::{Deserialize, Serialize};

/// User role with three ranked tiers.
///
/// Ordering is meaningful: `Guest < Registered < Admin`. Authorization
/// checks compare against a minimum tier via [`Role::at_least`] instead of
/// string-matching role names at call sites.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unconfirmed or anonymous account.
    #[default]
    Guest,
    /// Confirmed customer account.
    Registered,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Returns true when this role ranks at or above `minimum`.
    #[must_use]
    pub fn at_least(self, minimum: Self) -> bool {
        self >= minimum
    }

    /// Canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Registered => "registered",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            // "customer" appears in older data dumps; treat it as the
            // registered tier.
            "registered" | "customer" => Ok(Self::Registered),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

// SQLx support (with postgres feature): roles are stored as TEXT.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking() {
        assert!(Role::Admin.at_least(Role::Registered));
        assert!(Role::Admin.at_least(Role::Admin));
        assert!(Role::Registered.at_least(Role::Guest));
        assert!(!Role::Guest.at_least(Role::Registered));
        assert!(!Role::Registered.at_least(Role::Admin));
    }

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!("guest".parse::<Role>(), Ok(Role::Guest));
        assert_eq!("registered".parse::<Role>(), Ok(Role::Registered));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_legacy_customer_alias() {
        assert_eq!("customer".parse::<Role>(), Ok(Role::Registered));
    }

    #[test]
    fn test_display_roundtrip() {
        for role in [Role::Guest, Role::Registered, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }
}
