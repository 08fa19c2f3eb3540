//! Payment-intent API handlers.
//!
//! Each endpoint takes a product identifier or an email address, looks the
//! price up in the static catalog, creates one payment intent, and returns
//! only its client secret. Any other field in the request body, such as an
//! `amount`, is ignored.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use localguide_core::catalog::{self, CLAIM_LISTING, FEATURED_LISTING, Product};
use localguide_core::{CurrencyCode, Email, EmailError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::services::payments::{PaymentError, PaymentIntentRequest};
use crate::state::AppState;

/// Errors returned by the payment API as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum PaymentApiError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Invalid service")]
    InvalidService,

    #[error("Please enter a valid email address.")]
    InvalidEmail(#[source] EmailError),

    #[error("Payments are not configured")]
    NotConfigured,

    #[error(transparent)]
    Processor(#[from] PaymentError),
}

impl PaymentApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::InvalidService | Self::InvalidEmail(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Processor(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Processor(PaymentError::Api { message, .. }) => message.clone(),
            Self::Processor(_) => "Payment service unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Payment request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Body of a successful intent creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub client_secret: String,
}

/// `POST /api/payments/service-intent` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceIntentBody {
    pub service_id: String,
}

/// Body of the email-gated listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ListingIntentBody {
    pub email: String,
}

/// Public catalog entry.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub price: String,
}

impl From<&Product> for CatalogEntry {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            amount: product.price.amount_minor,
            currency: product.price.currency,
            price: product.price.display(),
        }
    }
}

/// Public price list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub services: Vec<CatalogEntry>,
    pub listing_offers: Vec<CatalogEntry>,
}

/// Build the payments router (mounted at `/api/payments`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services", get(services))
        .route("/service-intent", post(service_intent))
        .route("/featured-listing-intent", post(featured_listing_intent))
        .route("/claim-listing-intent", post(claim_listing_intent))
}

/// List purchasable products and their prices.
///
/// GET /api/payments/services
async fn services() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        services: catalog::SERVICES.iter().map(CatalogEntry::from).collect(),
        listing_offers: [&FEATURED_LISTING, &CLAIM_LISTING]
            .into_iter()
            .map(CatalogEntry::from)
            .collect(),
    })
}

/// Create an intent for a professional service.
///
/// POST /api/payments/service-intent
#[instrument(skip_all)]
async fn service_intent(
    State(state): State<AppState>,
    body: Result<Json<ServiceIntentBody>, JsonRejection>,
) -> Result<Json<ClientSecretResponse>, PaymentApiError> {
    let Json(body) = body.map_err(|_| PaymentApiError::InvalidBody)?;
    let product = catalog::find_service(&body.service_id).ok_or_else(|| {
        tracing::info!(service_id = %body.service_id, "Unknown service requested");
        PaymentApiError::InvalidService
    })?;

    create_intent(&state, PaymentIntentRequest::for_product(*product)).await
}

/// Create an intent to feature a listing.
///
/// POST /api/payments/featured-listing-intent
#[instrument(skip_all)]
async fn featured_listing_intent(
    State(state): State<AppState>,
    body: Result<Json<ListingIntentBody>, JsonRejection>,
) -> Result<Json<ClientSecretResponse>, PaymentApiError> {
    let email = parse_email(body)?;
    create_intent(&state, PaymentIntentRequest::with_receipt(FEATURED_LISTING, email)).await
}

/// Create an intent to claim a listing.
///
/// POST /api/payments/claim-listing-intent
#[instrument(skip_all)]
async fn claim_listing_intent(
    State(state): State<AppState>,
    body: Result<Json<ListingIntentBody>, JsonRejection>,
) -> Result<Json<ClientSecretResponse>, PaymentApiError> {
    let email = parse_email(body)?;
    create_intent(&state, PaymentIntentRequest::with_receipt(CLAIM_LISTING, email)).await
}

fn parse_email(
    body: Result<Json<ListingIntentBody>, JsonRejection>,
) -> Result<Email, PaymentApiError> {
    let Json(body) = body.map_err(|_| PaymentApiError::InvalidBody)?;
    Email::parse(&body.email).map_err(PaymentApiError::InvalidEmail)
}

async fn create_intent(
    state: &AppState,
    request: PaymentIntentRequest,
) -> Result<Json<ClientSecretResponse>, PaymentApiError> {
    let gateway = state.payments().ok_or(PaymentApiError::NotConfigured)?;
    let intent = gateway.create_payment_intent(&request).await?;

    Ok(Json(ClientSecretResponse {
        client_secret: intent.client_secret,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn error_of(err: PaymentApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        (status, value["error"].as_str().expect("error field").to_string())
    }

    #[tokio::test]
    async fn test_client_errors() {
        assert_eq!(
            error_of(PaymentApiError::InvalidService).await,
            (StatusCode::BAD_REQUEST, "Invalid service".to_string())
        );
        assert_eq!(
            error_of(PaymentApiError::InvalidBody).await,
            (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
        );
        assert_eq!(
            error_of(PaymentApiError::InvalidEmail(EmailError::MissingAtSymbol)).await,
            (
                StatusCode::BAD_REQUEST,
                "Please enter a valid email address.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_processor_message_passed_through() {
        let err = PaymentApiError::Processor(PaymentError::Api {
            status: 402,
            message: "Your card was declined.".to_string(),
        });
        assert_eq!(
            error_of(err).await,
            (StatusCode::BAD_GATEWAY, "Your card was declined.".to_string())
        );
    }

    #[tokio::test]
    async fn test_not_configured_is_server_error() {
        assert_eq!(
            error_of(PaymentApiError::NotConfigured).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Payments are not configured".to_string()
            )
        );
    }

    #[test]
    fn test_service_body_ignores_amount() {
        let body: ServiceIntentBody =
            serde_json::from_str(r#"{"serviceId":"website-5","amount":1,"currency":"jpy"}"#)
                .expect("extra fields are ignored");
        assert_eq!(body.service_id, "website-5");
    }

    #[test]
    fn test_catalog_entry_from_product() {
        let entry = CatalogEntry::from(&FEATURED_LISTING);
        assert_eq!(entry.amount, 4_900);
        assert_eq!(entry.price, "$49.00");
    }
}
