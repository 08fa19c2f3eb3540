//! Hosted identity service client.
//!
//! Talks to a GoTrue-compatible authentication API: resolves access tokens
//! to users, performs password sign-in for the admin login page, and revokes
//! tokens on logout.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::AuthServiceConfig;
use crate::models::AuthTokens;

/// Errors that can occur when interacting with the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Email/password pair was rejected.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// Client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A user as known to the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Port for the external identity service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an access token to its user.
    ///
    /// Returns `Ok(None)` when the service rejects the token (expired,
    /// revoked, or malformed).
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError>;

    /// Exchange an email and password for tokens.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

/// Token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// HTTP client for the hosted identity service.
#[derive(Clone)]
pub struct AuthServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthServiceClient {
    /// Create a new identity service client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AuthServiceConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| IdentityError::Config(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    async fn api_error(response: reqwest::Response) -> IdentityError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        IdentityError::Api { status, message }
    }
}

#[async_trait]
impl IdentityProvider for AuthServiceClient {
    #[instrument(skip_all)]
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json::<AuthUser>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(Self::api_error(response).await),
        }
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(AuthTokens::issued(
            token.access_token,
            token.expires_in,
            Utc::now(),
        ))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An already-invalid token has nothing left to revoke
        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(Self::api_error(response).await)
    }
}
