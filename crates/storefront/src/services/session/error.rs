//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during authentication operations.
///
/// `InvalidCredentials` and `Registration` carry the collaborator's own
/// message verbatim - callers render it as a transient notice and must not
/// retry or sign the user out.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth collaborator refused the credentials.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The auth collaborator refused the new-account request (e.g. the
    /// email is already registered).
    #[error("{0}")]
    Registration(String),

    /// A newer sign-in or sign-out overtook this operation while it was in
    /// flight; its completion was discarded rather than applied.
    #[error("superseded by a newer authentication request")]
    Superseded,

    /// Transport or contract failure talking to the collaborator.
    #[error(transparent)]
    Api(#[from] ApiError),
}
