//! S3-compatible object storage client for product images.
//!
//! Uploads are restricted to jpg/jpeg/png; the object key is derived from
//! the sha-256 of the filename, which both avoids collisions and strips any
//! path the client supplied. Requests are signed with AWS Signature V4
//! (headers `host`, `x-amz-content-sha256`, `x-amz-date`).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::StorageConfig;

type HmacSha256 = Hmac<Sha256>;

/// Accepted image extensions, lowercase.
const VALID_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Errors that can occur during an upload.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The filename extension is not an accepted image type.
    #[error("{0}")]
    UnsupportedExtension(String),

    /// The HTTP request failed.
    #[error("storage request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("storage rejected upload with status {status}")]
    Rejected {
        /// HTTP status code returned by the store.
        status: u16,
    },

    /// The configured endpoint is not a valid URL.
    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Object storage client.
pub struct StorageClient {
    http: reqwest::Client,
    access_key_id: String,
    secret_access_key: SecretString,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl StorageClient {
    /// Create a new storage client from configuration.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Upload an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnsupportedExtension` for anything but
    /// jpg/jpeg/png, `StorageError::Rejected` for a non-success response,
    /// `StorageError::Http` for transport failures.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, StorageError> {
        let extension = validate_extension(filename)?;
        let key = object_key(filename, extension);

        let (host, path) = self.host_and_path(&key)?;
        let url = format!("https://{host}{path}");

        let now = Utc::now();
        let payload_hash = sha256_hex(&bytes);
        let (amz_date, authorization) = self.sign(&host, &path, &payload_hash, now);

        let response = self
            .http
            .put(&url)
            .header("host", &host)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("authorization", authorization)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected {
                status: response.status().as_u16(),
            });
        }

        tracing::info!(bucket = %self.bucket, key = %key, "Uploaded image");
        Ok(url)
    }

    /// Resolve the request host and absolute path for an object key.
    fn host_and_path(&self, key: &str) -> Result<(String, String), StorageError> {
        match &self.endpoint {
            // Custom S3-compatible endpoint: path-style addressing
            Some(endpoint) => {
                let parsed = url::Url::parse(endpoint)
                    .map_err(|e| StorageError::InvalidEndpoint(e.to_string()))?;
                let host = parsed
                    .host_str()
                    .ok_or_else(|| StorageError::InvalidEndpoint(endpoint.clone()))?;
                let host = match parsed.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_owned(),
                };
                Ok((host, format!("/{}/{}", self.bucket, key)))
            }
            // AWS S3: virtual-hosted-style addressing
            None => Ok((
                format!("{}.s3.{}.amazonaws.com", self.bucket, self.region),
                format!("/{key}"),
            )),
        }
    }

    /// Produce the `x-amz-date` value and `Authorization` header for a PUT.
    fn sign(
        &self,
        host: &str,
        path: &str,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> (String, String) {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let canonical = canonical_request("PUT", path, host, &amz_date, payload_hash);
        let to_sign = string_to_sign(&amz_date, &date, &self.region, &canonical);
        let key = signing_key(
            self.secret_access_key.expose_secret(),
            &date,
            &self.region,
        );
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={access_key}/{date}/{region}/s3/aws4_request, \
             SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            access_key = self.access_key_id,
            region = self.region,
        );

        (amz_date, authorization)
    }
}

/// Headers included in the signature, sorted and semicolon-joined.
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Reject filenames whose extension is not an accepted image type, returning
/// the lowercase extension otherwise.
fn validate_extension(filename: &str) -> Result<&'static str, StorageError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    VALID_EXTENSIONS
        .into_iter()
        .find(|valid| **valid == *extension)
        .ok_or_else(|| {
            StorageError::UnsupportedExtension(
                "uploaded images must be jpg, jpeg, or png".to_string(),
            )
        })
}

/// Content-hashed object key: `uploads/{sha256(filename)}.{ext}`.
///
/// Hashing the client-supplied name removes any path components and makes
/// collisions for distinct names vanishingly unlikely.
fn object_key(filename: &str, extension: &str) -> String {
    let digest = Sha256::digest(filename.as_bytes());
    format!("uploads/{}.{extension}", hex::encode(digest))
}

/// Hex-encoded sha-256 of a payload.
fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// AWS SigV4 canonical request for a header-signed PUT with no query string.
fn canonical_request(
    method: &str,
    path: &str,
    host: &str,
    amz_date: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{path}\n\nhost:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload_hash}"
    )
}

/// AWS SigV4 string to sign.
fn string_to_sign(amz_date: &str, date: &str, region: &str, canonical_request: &str) -> String {
    format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{date}/{region}/s3/aws4_request\n{hash}",
        hash = sha256_hex(canonical_request.as_bytes())
    )
}

/// AWS SigV4 derived signing key.
fn signing_key(secret_access_key: &str, date: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, b"s3");
    hmac_sha256(&k_service, b"aws4_request")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_extensions_accepted() {
        assert_eq!(validate_extension("photo.jpg").unwrap(), "jpg");
        assert_eq!(validate_extension("photo.JPEG").unwrap(), "jpeg");
        assert_eq!(validate_extension("photo.PNG").unwrap(), "png");
    }

    #[test]
    fn test_invalid_extensions_rejected() {
        for name in ["photo.gif", "archive.zip", "noextension", "trailingdot."] {
            assert!(
                matches!(
                    validate_extension(name),
                    Err(StorageError::UnsupportedExtension(_))
                ),
                "expected rejection for {name:?}"
            );
        }
    }

    #[test]
    fn test_object_key_is_deterministic_and_pathless() {
        let a = object_key("../../etc/passwd.png", "png");
        let b = object_key("../../etc/passwd.png", "png");
        assert_eq!(a, b);
        assert!(a.starts_with("uploads/"));
        assert!(a.ends_with(".png"));
        // The hashed name contains no path separators beyond the prefix
        assert_eq!(a.matches('/').count(), 1);
    }

    #[test]
    fn test_object_key_differs_per_filename() {
        assert_ne!(object_key("a.png", "png"), object_key("b.png", "png"));
    }

    #[test]
    fn test_canonical_request_layout() {
        let canonical = canonical_request(
            "PUT",
            "/uploads/abc.png",
            "images.s3.us-east-1.amazonaws.com",
            "20260101T000000Z",
            "deadbeef",
        );
        let lines: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(lines[0], "PUT");
        assert_eq!(lines[1], "/uploads/abc.png");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "host:images.s3.us-east-1.amazonaws.com");
        assert_eq!(lines[4], "x-amz-content-sha256:deadbeef");
        assert_eq!(lines[5], "x-amz-date:20260101T000000Z");
        assert_eq!(lines[7], SIGNED_HEADERS);
        assert_eq!(lines[8], "deadbeef");
    }

    #[test]
    fn test_signing_key_varies_with_date() {
        let k1 = signing_key("secret", "20260101", "us-east-1");
        let k2 = signing_key("secret", "20260102", "us-east-1");
        assert_ne!(k1, k2);
        assert_eq!(k1.len(), 32);
    }

    #[test]
    fn test_string_to_sign_embeds_scope() {
        let sts = string_to_sign("20260101T000000Z", "20260101", "eu-west-1", "canonical");
        assert!(sts.starts_with("AWS4-HMAC-SHA256\n20260101T000000Z\n"));
        assert!(sts.contains("20260101/eu-west-1/s3/aws4_request"));
    }
}
