//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;

use thiserror::Error;

use ticketlive_storefront::api::ApiClient;
use ticketlive_storefront::config::{ConfigError, StorefrontConfig};
use ticketlive_storefront::services::{AuthError, CartManager, SessionManager};
use ticketlive_storefront::storage::LocalStorage;

/// Errors a CLI command can report.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An authentication operation failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// A collaborator call failed.
    #[error("{0}")]
    Api(#[from] ticketlive_storefront::api::ApiError),

    /// The email argument is not a valid address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ticketlive_core::EmailError),

    /// No catalog event carries the given id.
    #[error("no event with id {0} in the catalog")]
    EventNotFound(i32),
}

/// The wired-up managers a command drives.
pub struct Context {
    pub api: ApiClient,
    pub session: SessionManager,
    pub cart: CartManager,
}

/// Load configuration and construct the managers, hydrating persisted
/// state from the storage file.
pub fn context() -> Result<Context, CliError> {
    let config = StorefrontConfig::from_env()?;
    let storage = LocalStorage::open(&config.storage_path);

    let api = ApiClient::new(&config)?;
    let session = SessionManager::new(api.clone(), storage.clone(), config.auth_mode);
    let cart = CartManager::new(storage, &session);

    Ok(Context { api, session, cart })
}
