//! Stripe REST client.
//!
//! Products and customers are mirrored into Stripe; the local row stores the
//! Stripe id for correlation. Product deletion archives the Stripe resource
//! (`active=false`) - once a price object exists, Stripe products cannot be
//! hard-deleted over the API.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StripeConfig;

/// Currency for all prices.
const CURRENCY: &str = "jpy";

/// Errors from the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// The HTTP request failed.
    #[error("stripe request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe answered with an error object.
    #[error("stripe api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Stripe's error message.
        message: String,
    },

    /// A product has no active price to check out with.
    #[error("no active price for stripe product {0}")]
    NoActivePrice(String),

    /// The checkout session came back without a redirect URL.
    #[error("checkout session {0} has no redirect url")]
    MissingRedirectUrl(String),
}

/// A checkout line resolved to its Stripe product.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub stripe_product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeProduct {
    pub id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub id: String,
    pub active: bool,
    pub unit_amount: Option<i64>,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListObject<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct DeletedObject {
    #[allow(dead_code)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Stripe API client.
///
/// Cheaply cloneable; holds the HTTP connection pool and the secret key.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

impl StripeClient {
    /// Create a new Stripe client from configuration.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            secret_key: config.secret_key.clone(),
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product with an active price, returning the Stripe product id.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if either creation call fails.
    pub async fn create_product(&self, name: &str, price: i64) -> Result<String, StripeError> {
        let product: StripeProduct = self
            .request(Method::POST, "/v1/products", &[("name", name.to_owned())])
            .await?;

        let _: StripePrice = self
            .request(
                Method::POST,
                "/v1/prices",
                &price_params(&product.id, price),
            )
            .await?;

        Ok(product.id)
    }

    /// Push a name and/or price change to an existing product.
    ///
    /// A price change archives the currently active prices and creates a new
    /// one - Stripe prices are immutable.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if any underlying call fails.
    pub async fn update_product(
        &self,
        product_id: &str,
        new_name: Option<&str>,
        new_price: Option<i64>,
    ) -> Result<(), StripeError> {
        if let Some(name) = new_name {
            let _: StripeProduct = self
                .request(
                    Method::POST,
                    &format!("/v1/products/{product_id}"),
                    &[("name", name.to_owned())],
                )
                .await?;
        }

        if let Some(price) = new_price {
            for old in self.active_prices(product_id).await? {
                let _: StripePrice = self
                    .request(
                        Method::POST,
                        &format!("/v1/prices/{}", old.id),
                        &[("active", "false".to_owned())],
                    )
                    .await?;
            }
            let _: StripePrice = self
                .request(Method::POST, "/v1/prices", &price_params(product_id, price))
                .await?;
        }

        Ok(())
    }

    /// Retrieve a product, returning `None` when it has been archived.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if the call fails.
    pub async fn get_product(
        &self,
        product_id: &str,
    ) -> Result<Option<StripeProduct>, StripeError> {
        let product: StripeProduct = self
            .request(Method::GET, &format!("/v1/products/{product_id}"), &[])
            .await?;
        Ok(product.active.then_some(product))
    }

    /// Archive a product (`active=false`). Stripe products with prices
    /// cannot be hard-deleted over the API.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if the call fails.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), StripeError> {
        let _: StripeProduct = self
            .request(
                Method::POST,
                &format!("/v1/products/{product_id}"),
                &[("active", "false".to_owned())],
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Create a customer, returning the Stripe customer id.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if the call fails.
    pub async fn create_customer(
        &self,
        name: &str,
        email: &str,
        address: &str,
    ) -> Result<String, StripeError> {
        let customer: StripeCustomer = self
            .request(
                Method::POST,
                "/v1/customers",
                &[
                    ("name", name.to_owned()),
                    ("email", email.to_owned()),
                    ("metadata[address]", address.to_owned()),
                ],
            )
            .await?;
        Ok(customer.id)
    }

    /// Push profile changes to an existing customer.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if the call fails.
    pub async fn update_customer(
        &self,
        customer_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), StripeError> {
        let mut params = Vec::new();
        if let Some(name) = name {
            params.push(("name", name.to_owned()));
        }
        if let Some(email) = email {
            params.push(("email", email.to_owned()));
        }
        if params.is_empty() {
            return Ok(());
        }

        let _: StripeCustomer = self
            .request(
                Method::POST,
                &format!("/v1/customers/{customer_id}"),
                &params,
            )
            .await?;
        Ok(())
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `StripeError` if the call fails.
    pub async fn delete_customer(&self, customer_id: &str) -> Result<(), StripeError> {
        let _: DeletedObject = self
            .request(Method::DELETE, &format!("/v1/customers/{customer_id}"), &[])
            .await?;
        Ok(())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Create a Checkout Session for the given lines and return its redirect
    /// URL. Each line's active price is resolved first.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::NoActivePrice` when a product has no active
    /// price, `StripeError` for any failing call.
    pub async fn checkout(
        &self,
        lines: &[CheckoutLine],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, StripeError> {
        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            let price = self
                .active_prices(&line.stripe_product_id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| StripeError::NoActivePrice(line.stripe_product_id.clone()))?;
            priced.push((price.id, line.quantity));
        }

        let params = checkout_params(&priced, success_url, cancel_url);
        let session: CheckoutSession = self
            .request_owned(Method::POST, "/v1/checkout/sessions", &params)
            .await?;

        session
            .url
            .ok_or(StripeError::MissingRedirectUrl(session.id))
    }

    /// Active prices for a product, newest first (Stripe's default order).
    async fn active_prices(&self, product_id: &str) -> Result<Vec<StripePrice>, StripeError> {
        let list: ListObject<StripePrice> = self
            .request(
                Method::GET,
                "/v1/prices",
                &[
                    ("product", product_id.to_owned()),
                    ("active", "true".to_owned()),
                ],
            )
            .await?;
        Ok(list.data)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, StripeError> {
        let owned: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect();
        self.request_owned(method, path, &owned).await
    }

    async fn request_owned<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, StripeError> {
        let url = format!("{}{path}", self.api_base);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .basic_auth(self.secret_key.expose_secret(), None::<&str>);

        builder = if method == Method::GET {
            builder.query(params)
        } else {
            builder.form(params)
        };

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| "unknown stripe error".to_owned());
            Err(StripeError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Form parameters for creating a price on a product.
fn price_params(product_id: &str, unit_amount: i64) -> [(&'static str, String); 4] {
    [
        ("product", product_id.to_owned()),
        ("unit_amount", unit_amount.to_string()),
        ("currency", CURRENCY.to_owned()),
        ("tax_behavior", "exclusive".to_owned()),
    ]
}

/// Form parameters for a checkout session over priced lines.
fn checkout_params(
    priced_lines: &[(String, i64)],
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("success_url".to_owned(), success_url.to_owned()),
        ("cancel_url".to_owned(), cancel_url.to_owned()),
    ];
    for (index, (price_id, quantity)) in priced_lines.iter().enumerate() {
        params.push((format!("line_items[{index}][price]"), price_id.clone()));
        params.push((format!("line_items[{index}][quantity]"), quantity.to_string()));
    }
    params
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_params_shape() {
        let params = price_params("prod_123", 4500);
        assert_eq!(params[0], ("product", "prod_123".to_owned()));
        assert_eq!(params[1], ("unit_amount", "4500".to_owned()));
        assert_eq!(params[2], ("currency", "jpy".to_owned()));
        assert_eq!(params[3], ("tax_behavior", "exclusive".to_owned()));
    }

    #[test]
    fn test_checkout_params_indexes_lines() {
        let lines = vec![("price_a".to_owned(), 2), ("price_b".to_owned(), 1)];
        let params = checkout_params(&lines, "https://x/success", "https://x/cancel");

        assert!(params.contains(&("mode".to_owned(), "payment".to_owned())));
        assert!(params.contains(&("line_items[0][price]".to_owned(), "price_a".to_owned())));
        assert!(params.contains(&("line_items[0][quantity]".to_owned(), "2".to_owned())));
        assert!(params.contains(&("line_items[1][price]".to_owned(), "price_b".to_owned())));
        assert!(params.contains(&("line_items[1][quantity]".to_owned(), "1".to_owned())));
    }

    #[test]
    fn test_product_deserialization() {
        let json = r#"{"id":"prod_ABC","object":"product","name":"Shirt","active":true}"#;
        let product: StripeProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, "prod_ABC");
        assert!(product.active);
    }

    #[test]
    fn test_price_list_deserialization() {
        let json = r#"{"object":"list","data":[
            {"id":"price_1","object":"price","active":true,"unit_amount":4500,"currency":"jpy"}
        ],"has_more":false}"#;
        let list: ListObject<StripePrice> = serde_json::from_str(json).unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].unit_amount, Some(4500));
    }

    #[test]
    fn test_error_body_deserialization() {
        let json = r#"{"error":{"type":"invalid_request_error","message":"No such product"}}"#;
        let body: ApiErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.message.as_deref(), Some("No such product"));
    }

    #[test]
    fn test_checkout_session_deserialization() {
        let json = r#"{"id":"cs_test_1","object":"checkout.session","url":"https://checkout.stripe.com/pay/cs_test_1"}"#;
        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/pay/cs_test_1")
        );
    }
}
