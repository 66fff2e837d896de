//! Request and response types for the backend API.
//!
//! Wire field names follow the backend's existing contract, which mixes
//! conventions (`isAdmin` and `confirmPassword` in camelCase,
//! `profile_photo` in snake_case) - renames are therefore explicit rather
//! than blanket.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use ticketlive_core::Email;

use crate::models::UserSession;

/// Sign-in request data.
///
/// The password is wrapped in [`SecretString`] so it never appears in
/// `Debug` output; it is exposed only at the serialization boundary.
#[derive(Debug)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

/// New-account request data.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Body of an error response (`{ "message": ... }`).
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Successful sign-in payload.
#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    /// Bearer token; absent in cookie auth deployments.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserPayload>,
}

/// A user record as the auth collaborator ships it.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Role name; `"admin"` marks administrators in some deployments.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "isAdmin")]
    pub is_admin: Option<bool>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub birthday: Option<DateTime<Utc>>,
}

impl TryFrom<UserPayload> for UserSession {
    type Error = ticketlive_core::EmailError;

    fn try_from(payload: UserPayload) -> Result<Self, Self::Error> {
        let email = Email::parse(&payload.email)?;
        let is_admin =
            payload.is_admin.unwrap_or(false) || payload.role.as_deref() == Some("admin");

        Ok(Self {
            id: payload.id.into(),
            email,
            name: payload.name,
            is_admin,
            phone: payload.phone,
            address: payload.address,
            profile_photo: payload.profile_photo,
            birthday: payload.birthday,
        })
    }
}
