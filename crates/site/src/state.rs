//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::db::{PgProfileStore, PgSubmissionStore, ProfileStore, SubmissionStore};
use crate::services::auth::AdminGate;
use crate::services::identity::{AuthServiceClient, IdentityError, IdentityProvider};
use crate::services::listing_cache::ListingCache;
use crate::services::moderation::ModerationWorkflow;
use crate::services::payments::{PaymentError, PaymentGateway, StripeClient};

/// Error wiring up the production collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
    #[error("payment client: {0}")]
    Payments(#[from] PaymentError),
}

/// External collaborators the handlers talk to.
///
/// Production wiring comes from [`Collaborators::connect`]; tests supply
/// their own implementations.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    /// `None` when no payment key is configured.
    pub payments: Option<Arc<dyn PaymentGateway>>,
}

impl Collaborators {
    /// Build the HTTP clients and Postgres-backed stores.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be configured.
    pub fn connect(config: &SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let identity = AuthServiceClient::new(&config.auth)?;
        let payments = match &config.payments {
            Some(payments) => Some(Arc::new(StripeClient::new(payments)?) as Arc<dyn PaymentGateway>),
            None => None,
        };

        Ok(Self {
            identity: Arc::new(identity),
            profiles: Arc::new(PgProfileStore::new(pool.clone())),
            submissions: Arc::new(PgSubmissionStore::new(pool)),
            payments,
        })
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    collaborators: Collaborators,
    listing_cache: ListingCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SiteConfig, collaborators: Collaborators) -> Self {
        let listing_cache = ListingCache::new(config.listing_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                collaborators,
                listing_cache,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get the submission store.
    #[must_use]
    pub fn submissions(&self) -> &dyn SubmissionStore {
        self.inner.collaborators.submissions.as_ref()
    }

    /// Get the identity service client.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.collaborators.identity.as_ref()
    }

    /// Get the payment gateway, if payments are configured.
    #[must_use]
    pub fn payments(&self) -> Option<&dyn PaymentGateway> {
        self.inner.collaborators.payments.as_deref()
    }

    /// Get the rendered listing cache.
    #[must_use]
    pub fn listing_cache(&self) -> &ListingCache {
        &self.inner.listing_cache
    }

    /// Admin authorization gate over this state's collaborators.
    #[must_use]
    pub fn admin_gate(&self) -> AdminGate<'_> {
        AdminGate::new(
            self.inner.collaborators.identity.as_ref(),
            self.inner.collaborators.profiles.as_ref(),
        )
    }

    /// Moderation workflow over this state's collaborators.
    #[must_use]
    pub fn moderation(&self) -> ModerationWorkflow<'_> {
        ModerationWorkflow::new(
            self.inner.collaborators.identity.as_ref(),
            self.inner.collaborators.profiles.as_ref(),
            self.inner.collaborators.submissions.as_ref(),
            &self.inner.listing_cache,
        )
    }
}
