//! Integration test harness for Local Guide.
//!
//! Starts the real site router on an ephemeral port with in-memory
//! collaborators (identity service, profile and submission stores, payment
//! gateway) and an in-memory session store. Tests drive it over HTTP with a
//! cookie-keeping `reqwest` client that does not follow redirects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p localguide-integration-tests
//! ```
//!
//! No database or network access is needed.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use localguide_core::{SubmissionId, SubmissionStatus};
use localguide_site::config::{AuthServiceConfig, PaymentsConfig, SiteConfig};
use localguide_site::db::{ListingQuery, ProfileStore, RepositoryError, SubmissionStore};
use localguide_site::middleware::create_session_layer;
use localguide_site::models::{AuthTokens, Profile, Submission};
use localguide_site::services::identity::{AuthUser, IdentityError, IdentityProvider};
use localguide_site::services::payments::{
    PaymentError, PaymentGateway, PaymentIntent, PaymentIntentRequest,
};
use localguide_site::state::{AppState, Collaborators};
use secrecy::SecretString;
use tokio::sync::oneshot;
use tower_sessions::MemoryStore;
use uuid::Uuid;

/// Password accepted for every seeded account.
pub const PASSWORD: &str = "correct horse battery staple";

// =============================================================================
// Identity service
// =============================================================================

/// In-memory identity service keyed by email and access token.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, AuthUser>>,
    sessions: Mutex<HashMap<String, AuthUser>>,
    unavailable: Mutex<bool>,
    token_lifetime: Mutex<Option<i64>>,
    lookups: AtomicUsize,
}

impl FakeIdentity {
    /// Register an account that can sign in with [`PASSWORD`].
    pub fn add_account(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts.lock().expect("accounts lock").insert(
            email.to_string(),
            AuthUser {
                id,
                email: Some(email.to_string()),
            },
        );
        id
    }

    /// Make every subsequent user lookup fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().expect("unavailable lock") = unavailable;
    }

    /// Lifetime in seconds reported for tokens issued from now on.
    pub fn set_token_lifetime(&self, secs: Option<i64>) {
        *self.token_lifetime.lock().expect("lifetime lock") = secs;
    }

    /// Number of `current_user` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn token_lifetime(&self) -> Option<i64> {
        *self.token_lifetime.lock().expect("lifetime lock")
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, IdentityError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.lock().expect("unavailable lock") {
            return Err(IdentityError::Api {
                status: 503,
                message: "identity service unavailable".to_string(),
            });
        }
        Ok(self
            .sessions
            .lock()
            .expect("sessions lock")
            .get(access_token)
            .cloned())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, IdentityError> {
        let user = self
            .accounts
            .lock()
            .expect("accounts lock")
            .get(email)
            .cloned()
            .filter(|_| password == PASSWORD)
            .ok_or(IdentityError::InvalidCredentials)?;

        let access_token = format!("token-{}", Uuid::new_v4());
        self.sessions
            .lock()
            .expect("sessions lock")
            .insert(access_token.clone(), user);

        Ok(AuthTokens::issued(access_token, self.token_lifetime(), Utc::now()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.sessions
            .lock()
            .expect("sessions lock")
            .remove(access_token);
        Ok(())
    }
}

// =============================================================================
// Profile store
// =============================================================================

/// In-memory profile table.
#[derive(Default)]
pub struct FakeProfiles {
    rows: Mutex<HashMap<Uuid, Profile>>,
    failing: Mutex<bool>,
}

impl FakeProfiles {
    /// Insert or replace a profile row.
    pub fn upsert(&self, id: Uuid, email: Option<&str>, role: Option<&str>) {
        self.rows.lock().expect("profiles lock").insert(
            id,
            Profile {
                id,
                email: email.map(String::from),
                role: role.map(String::from),
            },
        );
    }

    /// Make every lookup fail as a policy denial would.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().expect("failing lock") = failing;
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        if *self.failing.lock().expect("failing lock") {
            return Err(RepositoryError::PermissionDenied(
                "permission denied for table profiles".to_string(),
            ));
        }
        Ok(self
            .rows
            .lock()
            .expect("profiles lock")
            .get(&user_id)
            .cloned())
    }
}

// =============================================================================
// Submission store
// =============================================================================

/// In-memory submissions table that records every write.
#[derive(Default)]
pub struct FakeSubmissions {
    rows: Mutex<Vec<Submission>>,
    writes: Mutex<Vec<(String, SubmissionStatus)>>,
    list_calls: AtomicUsize,
    failing_writes: Mutex<Option<String>>,
    list_hold: Mutex<Option<HeldList>>,
}

struct HeldList {
    snapshot_taken: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// Handle on a `list` call paused after reading its rows.
pub struct ListHold {
    snapshot_taken: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl ListHold {
    /// Wait until the paused call has read its rows.
    pub async fn snapshot_taken(&mut self) {
        (&mut self.snapshot_taken)
            .await
            .expect("held list call never ran");
    }

    /// Let the paused call return its rows.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl FakeSubmissions {
    /// Seed a pending submission.
    pub fn add_pending(&self, id: &str, business_name: &str) {
        let created_at = Utc
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        self.rows.lock().expect("rows lock").push(Submission {
            id: SubmissionId::parse(id).expect("valid id"),
            created_at,
            updated_at: created_at,
            business_name: business_name.to_string(),
            contact_email: Some("owner@example.com".to_string()),
            phone: None,
            website: None,
            address: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            status: SubmissionStatus::Pending,
            site_id: None,
        });
    }

    /// Pause the next `list` call after it has read its rows, until the
    /// returned handle is released.
    pub fn hold_next_list(&self) -> ListHold {
        let (taken_tx, taken_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.list_hold.lock().expect("hold lock") = Some(HeldList {
            snapshot_taken: taken_tx,
            release: release_rx,
        });
        ListHold {
            snapshot_taken: taken_rx,
            release: release_tx,
        }
    }

    /// Fail every write with a permission error carrying `message`.
    pub fn fail_writes_with(&self, message: &str) {
        *self.failing_writes.lock().expect("failing lock") = Some(message.to_string());
    }

    /// Current status of a seeded submission.
    pub fn status_of(&self, id: &str) -> Option<SubmissionStatus> {
        self.rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.id.as_str() == id)
            .map(|row| row.status)
    }

    /// Every `set_status` call so far, in order.
    pub fn writes(&self) -> Vec<(String, SubmissionStatus)> {
        self.writes.lock().expect("writes lock").clone()
    }

    /// Number of `list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionStore for FakeSubmissions {
    async fn list(&self, query: &ListingQuery) -> Result<Vec<Submission>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows: Vec<Submission> = self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|row| query.status.is_none_or(|status| row.status == status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let hold = self.list_hold.lock().expect("hold lock").take();
        if let Some(hold) = hold {
            let _ = hold.snapshot_taken.send(());
            let _ = hold.release.await;
        }
        Ok(rows)
    }

    async fn set_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<u64, RepositoryError> {
        self.writes
            .lock()
            .expect("writes lock")
            .push((id.as_str().to_string(), status));

        if let Some(message) = self.failing_writes.lock().expect("failing lock").clone() {
            return Err(RepositoryError::PermissionDenied(message));
        }

        let mut rows = self.rows.lock().expect("rows lock");
        let mut updated = 0;
        for row in rows.iter_mut().filter(|row| row.id == *id) {
            row.status = status;
            updated += 1;
        }
        Ok(updated)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Payment gateway
// =============================================================================

/// Payment gateway that records requests and returns canned secrets.
#[derive(Default)]
pub struct FakeGateway {
    requests: Mutex<Vec<PaymentIntentRequest>>,
    decline: Mutex<Option<String>>,
}

impl FakeGateway {
    /// Reject every subsequent request with a processor message.
    pub fn decline_with(&self, message: &str) {
        *self.decline.lock().expect("decline lock") = Some(message.to_string());
    }

    /// Every intent request received so far.
    pub fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut requests = self.requests.lock().expect("requests lock");
        requests.push(request.clone());

        if let Some(message) = self.decline.lock().expect("decline lock").clone() {
            return Err(PaymentError::Api {
                status: 402,
                message,
            });
        }

        let n = requests.len();
        Ok(PaymentIntent {
            id: format!("pi_test_{n}"),
            client_secret: format!("pi_test_{n}_secret_{}", request.product.id),
        })
    }
}

// =============================================================================
// Server
// =============================================================================

/// Knobs for [`TestServer::start_with`].
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Run as `production` (hides the redirect `reason`).
    pub production: bool,
    /// Wire a payment gateway.
    pub payments: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            production: false,
            payments: true,
        }
    }
}

/// A running site with its fakes.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub identity: Arc<FakeIdentity>,
    pub profiles: Arc<FakeProfiles>,
    pub submissions: Arc<FakeSubmissions>,
    pub gateway: Arc<FakeGateway>,
}

impl TestServer {
    /// Start with default options.
    pub async fn start() -> Self {
        Self::start_with(ServerOptions::default()).await
    }

    /// Start on an ephemeral port.
    pub async fn start_with(options: ServerOptions) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let profiles = Arc::new(FakeProfiles::default());
        let submissions = Arc::new(FakeSubmissions::default());
        let gateway = Arc::new(FakeGateway::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let config = test_config(addr, options);

        let collaborators = Collaborators {
            identity: identity.clone(),
            profiles: profiles.clone(),
            submissions: submissions.clone(),
            payments: options
                .payments
                .then(|| gateway.clone() as Arc<dyn PaymentGateway>),
        };

        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let app = localguide_site::app(AppState::new(config, collaborators)).layer(session_layer);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("http client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            identity,
            profiles,
            submissions,
            gateway,
        }
    }

    /// Absolute URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Seed an account whose profile has `role`, and sign in as it.
    pub async fn sign_in_with_role(&self, email: &str, role: Option<&str>) -> Uuid {
        let id = self.identity.add_account(email);
        self.profiles.upsert(id, Some(email), role);
        self.sign_in(email).await;
        id
    }

    /// Sign in through the login form; the session cookie is kept by the
    /// client.
    pub async fn sign_in(&self, email: &str) {
        let response = self
            .client
            .post(self.url("/admin/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
            .expect("login request");
        assert_eq!(
            response.status(),
            reqwest::StatusCode::SEE_OTHER,
            "sign-in as {email} should redirect"
        );
    }

    /// POST the moderation form.
    pub async fn set_status(&self, id: &str, status: &str) -> reqwest::Response {
        self.client
            .post(self.url("/admin/submissions/status"))
            .form(&[("id", id), ("status", status)])
            .send()
            .await
            .expect("status request")
    }

    /// POST a JSON body to a payment endpoint.
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("payment request")
    }
}

/// `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect has a Location header")
        .to_string()
}

fn test_config(addr: SocketAddr, options: ServerOptions) -> SiteConfig {
    SiteConfig {
        database_url: SecretString::from("postgres://unused"),
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        environment: if options.production {
            "production".to_string()
        } else {
            "test".to_string()
        },
        site_id: None,
        listing_cache_ttl: Duration::from_secs(300),
        auth: AuthServiceConfig {
            url: "http://identity.invalid".to_string(),
            anon_key: SecretString::from("anon"),
        },
        payments: options.payments.then(|| PaymentsConfig {
            secret_key: SecretString::from("sk_test_unused"),
            api_base: "http://payments.invalid".to_string(),
        }),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
