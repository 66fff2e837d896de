//! Integration tests for the TicketLive client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ticketlive-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flows` - Sign-in/out, registration, refresh, broadcast fan-out
//! - `cart_flows` - Session-coupled cart scenarios
//!
//! Every test runs against a `wiremock` stand-in for the backend
//! collaborator, with in-memory local storage shared between the managers
//! exactly as a browser profile would be.

use secrecy::SecretString;
use url::Url;
use wiremock::MockServer;

use ticketlive_core::Email;
use ticketlive_storefront::api::{ApiClient, Credentials};
use ticketlive_storefront::config::{AuthMode, StorefrontConfig};
use ticketlive_storefront::services::{CartManager, SessionManager};
use ticketlive_storefront::storage::LocalStorage;

/// Both managers wired over one storage profile and one mock collaborator.
pub struct TestHarness {
    pub server: MockServer,
    pub storage: LocalStorage,
    pub api: ApiClient,
    pub session: SessionManager,
    pub cart: CartManager,
}

impl TestHarness {
    /// Start a mock collaborator and construct the managers against it.
    ///
    /// # Panics
    ///
    /// Panics if the mock server or HTTP client cannot be constructed.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self::over(server, LocalStorage::in_memory())
    }

    /// Construct the managers over an existing server and storage - used to
    /// model a "second tab" sharing the same profile.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn over(server: MockServer, storage: LocalStorage) -> Self {
        let config = config_for(&server);
        #[allow(clippy::unwrap_used)]
        let api = ApiClient::new(&config).unwrap();
        let session = SessionManager::new(api.clone(), storage.clone(), config.auth_mode);
        let cart = CartManager::new(storage.clone(), &session);

        Self {
            server,
            storage,
            api,
            session,
            cart,
        }
    }
}

/// Client configuration pointing at the mock collaborator.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn config_for(server: &MockServer) -> StorefrontConfig {
    StorefrontConfig {
        api_url: Url::parse(&server.uri()).unwrap(),
        auth_mode: AuthMode::Bearer,
        storage_path: std::path::PathBuf::from("unused.json"),
    }
}

/// Credentials for the canonical test account.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: Email::parse(email).unwrap(),
        password: SecretString::from(password.to_owned()),
    }
}

/// The canonical user record the mock collaborator ships.
#[must_use]
pub fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "665f1c2e9b1d",
        "email": "ana@example.com",
        "name": "Ana",
        "role": "user",
        "phone": "5550100",
        "profile_photo": "ana.jpg"
    })
}

/// A catalog event record with the given id and price.
#[must_use]
pub fn event_json(id: i32, price: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Evento {id}"),
        "description": "En vivo",
        "date": "2026-09-12T20:00:00Z",
        "time": "20:00",
        "location": "Foro Central",
        "capacity": 120,
        "price": price,
        "imageUrl": format!("https://cdn.example.com/{id}.jpg"),
        "status": true,
        "category": "Musica"
    })
}
