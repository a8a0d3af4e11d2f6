//! Email service for account confirmation mail.
//!
//! Uses SMTP via lettre for delivery. Confirmation links carry the base64
//! user id and a signed, time-boxed token; both are verified statelessly on
//! the way back in.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use wardrobe_core::{Email, UserId};

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Error decoding the user-id segment of a confirmation link.
#[derive(Debug, Error)]
#[error("invalid confirmation link")]
pub struct UidDecodeError;

/// Email service for transactional mail.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the account confirmation email.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or relayed.
    pub async fn send_confirmation_email(
        &self,
        to: &Email,
        confirmation_url: &str,
    ) -> Result<(), EmailError> {
        let body = format!(
            "Please click the following link to verify your email: {confirmation_url}"
        );

        self.send_plain_email(to, "Confirm your email", &body).await
    }

    /// Send a plain-text email.
    async fn send_plain_email(
        &self,
        to: &Email,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Build the confirmation URL embedded in the email.
///
/// The first path segment is the base64url-encoded user id, the second the
/// signed confirmation token.
#[must_use]
pub fn confirmation_url(frontend_base_url: &str, user_id: UserId, token: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!(
        "{base}/email-confirmation/{uid}/{token}/",
        uid = encode_uid(user_id)
    )
}

/// Encode a user id as the url-safe base64 of its decimal form.
#[must_use]
pub fn encode_uid(user_id: UserId) -> String {
    URL_SAFE_NO_PAD.encode(user_id.to_string())
}

/// Decode a user id produced by [`encode_uid`].
///
/// # Errors
///
/// Returns `UidDecodeError` for anything that is not base64 over a decimal id.
pub fn decode_uid(uid: &str) -> Result<UserId, UidDecodeError> {
    let bytes = URL_SAFE_NO_PAD.decode(uid).map_err(|_| UidDecodeError)?;
    let text = String::from_utf8(bytes).map_err(|_| UidDecodeError)?;
    let id: i32 = text.parse().map_err(|_| UidDecodeError)?;
    Ok(UserId::new(id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_roundtrip() {
        for raw in [1, 42, 999_999] {
            let encoded = encode_uid(UserId::new(raw));
            assert_eq!(decode_uid(&encoded).unwrap(), UserId::new(raw));
        }
    }

    #[test]
    fn test_decode_uid_rejects_garbage() {
        assert!(decode_uid("!!!").is_err());
        // Valid base64, but not a decimal id
        let encoded = URL_SAFE_NO_PAD.encode("not-a-number");
        assert!(decode_uid(&encoded).is_err());
    }

    #[test]
    fn test_confirmation_url_shape() {
        let url = confirmation_url("http://127.0.0.1:3000", UserId::new(7), "tok123");
        let uid = encode_uid(UserId::new(7));
        assert_eq!(url, format!("http://127.0.0.1:3000/email-confirmation/{uid}/tok123/"));
    }

    #[test]
    fn test_confirmation_url_strips_trailing_slash() {
        let with_slash = confirmation_url("https://shop.example/", UserId::new(7), "t");
        let without = confirmation_url("https://shop.example", UserId::new(7), "t");
        assert_eq!(with_slash, without);
    }
}
