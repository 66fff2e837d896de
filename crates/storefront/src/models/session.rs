//! Session-related types.
//!
//! The authenticated-user record kept in memory and mirrored to local
//! storage, plus the storage keys both managers persist under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ticketlive_core::{Email, UserId};

/// The authenticated-user record.
///
/// Created on successful login or hydrated from storage at startup. A
/// non-`None` session always has a byte-identical persisted copy under
/// [`storage_keys::USER`]; every mutation re-persists before anything else
/// observes the change.
///
/// The bearer token is NOT part of this record - it lives under its own
/// storage key (and not at all in cookie auth mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    /// Backend-assigned user ID.
    pub id: UserId,
    /// The account email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Authorization flag; informational only in this client.
    #[serde(default)]
    pub is_admin: bool,
    /// Optional profile fields.
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub birthday: Option<DateTime<Utc>>,
}

impl UserSession {
    /// Merge a partial update into this session.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        if let Some(profile_photo) = patch.profile_photo {
            self.profile_photo = Some(profile_photo);
        }
        if let Some(birthday) = patch.birthday {
            self.birthday = Some(birthday);
        }
    }
}

/// A partial session update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_photo: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
}

/// Storage keys for persisted client state.
///
/// Consumers never touch these directly - the managers own them. The
/// literal values are load-bearing: existing profiles were written by
/// earlier clients under these names.
pub mod storage_keys {
    /// Key for the persisted session record.
    pub const USER: &str = "ticketlive_user";

    /// Key for the bearer credential (bearer auth mode only).
    pub const TOKEN: &str = "auth_token";

    /// Key for the persisted cart lines.
    pub const CART: &str = "cart";
}
