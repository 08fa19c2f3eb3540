//! Payment processor client.
//!
//! Creates payment intents against a Stripe-compatible API. Only the
//! client secret ever leaves the server; amounts come from the price catalog
//! in `localguide_core::catalog`.

use async_trait::async_trait;
use localguide_core::catalog::Product;
use localguide_core::Email;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::PaymentsConfig;

/// Errors that can occur when creating a payment intent.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Processor rejected the request.
    #[error("payment processor error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Everything the processor needs to create one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub product: Product,
    pub receipt_email: Option<Email>,
}

impl PaymentIntentRequest {
    /// Intent for a catalog product with no receipt email.
    #[must_use]
    pub const fn for_product(product: Product) -> Self {
        Self {
            product,
            receipt_email: None,
        }
    }

    /// Intent for a catalog product with a receipt email.
    #[must_use]
    pub const fn with_receipt(product: Product, email: Email) -> Self {
        Self {
            product,
            receipt_email: Some(email),
        }
    }

    /// Form fields sent to the processor.
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("amount", self.product.price.amount_minor.to_string()),
            (
                "currency",
                self.product.price.currency.as_api_str().to_string(),
            ),
            ("metadata[product_id]", self.product.id.to_string()),
            ("metadata[product_name]", self.product.name.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        if let Some(email) = &self.receipt_email {
            fields.push(("receipt_email", email.as_str().to_string()));
        }
        fields
    }
}

/// A created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Port for the payment processor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create exactly one payment intent. No retries.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the payment processor.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new payment processor client.
    ///
    /// # Errors
    ///
    /// Returns error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Config(format!("Invalid secret key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[instrument(skip_all, fields(product_id = request.product.id))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let response = self
            .client
            .post(&url)
            .form(&request.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response.json().await?;
        tracing::info!(intent_id = %intent.id, "Created payment intent");
        Ok(intent)
    }
}
