//! Backend API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local sync, direct API calls
//! - Plain REST over `reqwest`; non-2xx responses carry `{ "message": ... }`
//! - In-memory caching via `moka` for the event catalog (5 minute TTL)
//!
//! # Endpoints
//!
//! - `POST /auth/login`, `POST /auth/register` - authentication collaborator
//! - `GET /users/profile` - current-user record (bearer header or cookie)
//! - `GET /events` - ordered event catalog
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketlive_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//!
//! let events = client.list_events().await?;
//! let response = client.sign_in(&credentials).await?;
//! ```

pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{AuthMode, StorefrontConfig};
use crate::models::Event;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, bad TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The collaborator rejected the request; the message is its own,
    /// verbatim, and is what callers surface to the user.
    #[error("{0}")]
    Rejected(String),

    /// A 2xx response was missing data the contract promises.
    #[error("malformed payload: {0}")]
    Payload(String),
}

const EVENTS_CACHE_KEY: &str = "events";

/// Client for the TicketLive backend API.
///
/// Cheaply cloneable; the catalog is cached for 5 minutes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, Arc<Vec<Event>>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// In cookie auth mode the underlying HTTP client keeps a cookie store
    /// so the session cookie set by `POST /auth/login` rides along on
    /// subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(config.auth_mode == AuthMode::Cookie)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base(),
                cache,
            }),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit credentials to the auth collaborator.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the collaborator's message when the
    /// credentials are refused, or a transport/decoding error.
    #[instrument(skip(self, credentials))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignInResponse, ApiError> {
        let url = format!("{}/auth/login", self.inner.base_url);
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json().await?)
    }

    /// Submit a new-account request.
    ///
    /// Registration never authenticates the caller; a subsequent explicit
    /// sign-in is required.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the collaborator's message (e.g.
    /// duplicate email), or a transport error.
    #[instrument(skip(self, account))]
    pub async fn sign_up(&self, account: &NewAccount) -> Result<(), ApiError> {
        let url = format!("{}/auth/register", self.inner.base_url);
        let body = serde_json::json!({
            "name": account.name,
            "email": account.email,
            "password": account.password.expose_secret(),
            "confirmPassword": account.confirm_password.expose_secret(),
            "phone": account.phone,
            "address": account.address,
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(())
    }

    /// Fetch the current user's profile record.
    ///
    /// `token` carries the bearer credential in bearer auth mode; in cookie
    /// mode pass `None` and the cookie store authenticates the call.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the collaborator refuses the
    /// credential, or a transport/decoding error.
    #[instrument(skip(self, token))]
    pub async fn fetch_profile(&self, token: Option<&str>) -> Result<UserPayload, ApiError> {
        let url = format!("{}/users/profile", self.inner.base_url);

        let mut request = self.inner.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        // Some deployments return the user record directly, others wrap it
        decode_profile(response.json().await?)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the event catalog, in the collaborator's order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        // Check cache
        if let Some(events) = self.inner.cache.get(EVENTS_CACHE_KEY).await {
            debug!("Cache hit for events");
            return Ok(events.as_ref().clone());
        }

        let url = format!("{}/events", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let events: Vec<Event> = response.json().await?;

        // Cache the result
        self.inner
            .cache
            .insert(EVENTS_CACHE_KEY.to_string(), Arc::new(events.clone()))
            .await;

        Ok(events)
    }
}

/// Decode a non-2xx response into `ApiError::Rejected`, preserving the
/// collaborator's message when one is present.
async fn rejection(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorBody>(&text)
        .map_or_else(|_| format!("request failed with status {status}"), |body| body.message);

    ApiError::Rejected(message)
}

/// Accept the profile record either bare or wrapped in `{ "user": ... }`.
fn decode_profile(value: serde_json::Value) -> Result<UserPayload, ApiError> {
    if let Ok(payload) = serde_json::from_value::<UserPayload>(value.clone()) {
        return Ok(payload);
    }

    let nested = value
        .get("user")
        .cloned()
        .ok_or_else(|| ApiError::Payload("profile response missing user record".to_string()))?;

    Ok(serde_json::from_value(nested)?)
}
