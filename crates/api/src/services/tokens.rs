//! Stateless signed tokens.
//!
//! Tokens are `base64url(claims).base64url(hmac-sha256(claims))`, carrying
//! the user id, role, purpose, and expiry. Verification needs only the
//! signing secret, so access, refresh, and email-confirmation tokens are all
//! checked without any server-side token state.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use wardrobe_core::{Role, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Access tokens are short-lived.
pub const ACCESS_TTL_SECONDS: i64 = 60 * 60;
/// Refresh tokens last 30 days.
pub const REFRESH_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
/// Email-confirmation links are valid for one day.
pub const EMAIL_CONFIRMATION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// What a token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Bearer token for API requests.
    Access,
    /// Exchangeable for a fresh access token.
    Refresh,
    /// One-shot email confirmation link.
    EmailConfirmation,
}

impl TokenPurpose {
    /// Lifetime for tokens of this purpose.
    #[must_use]
    pub const fn ttl_seconds(self) -> i64 {
        match self {
            Self::Access => ACCESS_TTL_SECONDS,
            Self::Refresh => REFRESH_TTL_SECONDS,
            Self::EmailConfirmation => EMAIL_CONFIRMATION_TTL_SECONDS,
        }
    }
}

/// Signed token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub role: Role,
    pub purpose: TokenPurpose,
    /// Unix timestamp after which the token is rejected.
    pub expires_at: i64,
}

/// Errors from issuing or verifying a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token does not have the `payload.signature` shape.
    #[error("malformed token")]
    Malformed,

    /// The signature does not match the payload.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,

    /// The token is valid but for a different purpose.
    #[error("token not valid for this operation")]
    WrongPurpose,

    /// Claims failed to serialize.
    #[error("failed to encode claims: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// HMAC-SHA256 token signer/verifier.
pub struct TokenService {
    key: SecretString,
}

impl TokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { key: secret }
    }

    /// Issue a token for `user_id` with the given purpose, valid from `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Serialization` if the claims fail to encode.
    pub fn issue(
        &self,
        user_id: UserId,
        role: Role,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            role,
            purpose,
            expires_at: now.timestamp() + purpose.ttl_seconds(),
        };
        let payload = serde_json::to_vec(&claims)?;
        let signature = self.sign(&payload);

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` for undecodable input,
    /// `TokenError::InvalidSignature` for a bad signature,
    /// `TokenError::Expired` past the expiry, and `TokenError::WrongPurpose`
    /// when the purpose doesn't match `expected`.
    pub fn verify(
        &self,
        token: &str,
        expected: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.expires_at <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        if claims.purpose != expected {
            return Err(TokenError::WrongPurpose);
        }

        Ok(claims)
    }

    // HMAC accepts keys of any length
    #[allow(clippy::expect_used)]
    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .expect("HMAC accepts any key length")
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn service() -> TokenService {
        TokenService::new(SecretString::from("k9#mQ2$vX7!pL4@wN8^rT1&zB5*dF3(j"))
    }

    fn at(timestamp: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let service = service();
        let token = service
            .issue(UserId::new(42), Role::Registered, TokenPurpose::Access, at(1_000))
            .unwrap();

        let claims = service
            .verify(&token, TokenPurpose::Access, at(1_000 + 30))
            .unwrap();
        assert_eq!(claims.user_id, UserId::new(42));
        assert_eq!(claims.role, Role::Registered);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        let token = service
            .issue(UserId::new(1), Role::Registered, TokenPurpose::Access, at(0))
            .unwrap();

        let result = service.verify(&token, TokenPurpose::Access, at(ACCESS_TTL_SECONDS + 1));
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_purpose_rejected() {
        let service = service();
        let token = service
            .issue(UserId::new(1), Role::Registered, TokenPurpose::Refresh, at(0))
            .unwrap();

        let result = service.verify(&token, TokenPurpose::Access, at(10));
        assert!(matches!(result, Err(TokenError::WrongPurpose)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = service();
        let token = service
            .issue(UserId::new(1), Role::Registered, TokenPurpose::Access, at(0))
            .unwrap();

        // Swap in a forged payload claiming admin, keeping the old signature
        let signature = token.split('.').nth(1).unwrap();
        let forged_claims = Claims {
            user_id: UserId::new(1),
            role: Role::Admin,
            purpose: TokenPurpose::Access,
            expires_at: ACCESS_TTL_SECONDS,
        };
        let forged_payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{signature}");

        let result = service.verify(&forged, TokenPurpose::Access, at(10));
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_rejected_as_malformed() {
        let service = service();
        for garbage in ["", "no-dot", "a.b", "!!!.???"] {
            let result = service.verify(garbage, TokenPurpose::Access, at(10));
            assert!(
                matches!(result, Err(TokenError::Malformed)),
                "expected malformed for {garbage:?}"
            );
        }
    }

    #[test]
    fn test_different_secret_rejected() {
        let issuing = service();
        let verifying =
            TokenService::new(SecretString::from("Z8@qW3$eR6!tY1#uI9^oP4&aS7*dG2(h"));
        let token = issuing
            .issue(UserId::new(1), Role::Registered, TokenPurpose::Access, at(0))
            .unwrap();

        let result = verifying.verify(&token, TokenPurpose::Access, at(10));
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }
}
