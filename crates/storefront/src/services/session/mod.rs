//! Session manager.
//!
//! The single source of truth for "who is logged in", for every consumer in
//! the process - including consumers constructed before or after a login.
//! Two states: `Anonymous` and `Authenticated`. The initial state is derived
//! synchronously from local storage at construction; no network round-trip
//! gates first use.
//!
//! Every state-changing operation persists to storage and then publishes a
//! [`SessionTransition`] synchronously before returning, so any observer
//! (the cart manager, a navigation bar) sees storage already updated when
//! it is notified.
//!
//! Overlapping network operations are ordered explicitly: each sign-in,
//! refresh, or sign-out advances a generation counter, and a completion
//! holding a stale generation is discarded instead of silently winning the
//! race.

mod error;

pub use error::AuthError;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError, Credentials, NewAccount};
use crate::broadcast::{SessionBroadcast, SessionObserver, SessionTransition, Subscription};
use crate::config::AuthMode;
use crate::models::session::{SessionPatch, UserSession, storage_keys};
use crate::storage::LocalStorage;

/// The session manager.
///
/// Cheaply cloneable; all clones share state, so independently-constructed
/// consumers can each hold one.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    storage: LocalStorage,
    auth_mode: AuthMode,
    current: RwLock<Option<UserSession>>,
    /// Generation counter ordering overlapping auth operations.
    generation: AtomicU64,
    broadcast: SessionBroadcast,
}

impl SessionManager {
    /// Create a session manager, deriving the initial state from storage.
    #[must_use]
    pub fn new(api: ApiClient, storage: LocalStorage, auth_mode: AuthMode) -> Self {
        let current: Option<UserSession> = storage.get(storage_keys::USER);
        if let Some(session) = &current {
            debug!("hydrated session for {}", session.email);
        }

        Self {
            inner: Arc::new(SessionInner {
                api,
                storage,
                auth_mode,
                current: RwLock::new(current),
                generation: AtomicU64::new(0),
                broadcast: SessionBroadcast::new(),
            }),
        }
    }

    // =========================================================================
    // State views
    // =========================================================================

    /// The current session, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserSession> {
        self.inner.read().clone()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Register an observer of session transitions.
    ///
    /// Held weakly: a dropped observer falls out of the fan-out on the next
    /// publish.
    pub fn subscribe(&self, observer: Weak<dyn SessionObserver>) {
        self.inner.broadcast.subscribe(observer);
    }

    /// Register a closure observer; dropping the returned [`Subscription`]
    /// unsubscribes.
    pub fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(SessionTransition) + Send + Sync + 'static,
    {
        self.inner.broadcast.subscribe_fn(f)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On success the session is persisted, the in-memory state updated, and
    /// `SignedIn` broadcast - in that order - before this returns. On any
    /// failure both copies are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] with the collaborator's
    /// message when the credentials are refused,
    /// [`AuthError::Superseded`] when a newer auth operation overtook this
    /// one, or [`AuthError::Api`] on transport failure.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: Credentials) -> Result<UserSession, AuthError> {
        let generation = self.inner.begin_operation();

        let response = self
            .inner
            .api
            .sign_in(&credentials)
            .await
            .map_err(|e| match e {
                ApiError::Rejected(message) => AuthError::InvalidCredentials(message),
                other => AuthError::Api(other),
            })?;

        if !self.inner.is_current(generation) {
            debug!("discarding stale sign-in completion");
            return Err(AuthError::Superseded);
        }

        let payload = response.user.ok_or_else(|| {
            AuthError::Api(ApiError::Payload(
                "sign-in response missing user record".to_string(),
            ))
        })?;
        let session = UserSession::try_from(payload)
            .map_err(|e| AuthError::Api(ApiError::Payload(e.to_string())))?;

        if self.inner.auth_mode == AuthMode::Bearer
            && let Some(token) = response.token
            && let Err(e) = self.inner.storage.set(storage_keys::TOKEN, &token)
        {
            warn!("failed to persist token: {e}");
        }

        self.inner.commit(Some(session.clone()), SessionTransition::SignedIn);
        Ok(session)
    }

    /// Submit a new-account request.
    ///
    /// Never authenticates the caller - a subsequent explicit [`login`] is
    /// required.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Registration`] with the collaborator's message
    /// (e.g. duplicate email), or [`AuthError::Api`] on transport failure.
    ///
    /// [`login`]: Self::login
    #[instrument(skip(self, account))]
    pub async fn register(&self, account: NewAccount) -> Result<(), AuthError> {
        self.inner.api.sign_up(&account).await.map_err(|e| match e {
            ApiError::Rejected(message) => AuthError::Registration(message),
            other => AuthError::Api(other),
        })
    }

    /// Sign out.
    ///
    /// Clears the in-memory session, removes the persisted session and
    /// token records together, and broadcasts `SignedOut` before returning.
    /// Idempotent - signing out twice is not an error.
    pub fn logout(&self) {
        self.inner.begin_operation();

        if let Err(e) = self
            .inner
            .storage
            .remove_many(&[storage_keys::USER, storage_keys::TOKEN])
        {
            warn!("failed to remove persisted session: {e}");
        }

        self.inner.commit(None, SessionTransition::SignedOut);
    }

    /// Re-derive the session from the profile collaborator.
    ///
    /// Soft-fail by design: a collaborator or transport failure falls back
    /// to whatever is persisted - a network error must never sign the user
    /// out. A fetched profile merges over the persisted record (the stored
    /// `profile_photo` survives when the collaborator omits one).
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Option<UserSession> {
        let generation = self.inner.begin_operation();

        let saved: Option<UserSession> = self.inner.storage.get(storage_keys::USER);
        let token: Option<String> = self.inner.storage.get(storage_keys::TOKEN);

        // Without a credential there is nothing to present; keep what we have
        if self.inner.auth_mode == AuthMode::Bearer && token.is_none() {
            return saved;
        }

        let payload = match self.inner.api.fetch_profile(token.as_deref()).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("profile refresh failed, keeping persisted session: {e}");
                return saved;
            }
        };

        if !self.inner.is_current(generation) {
            debug!("discarding stale refresh completion");
            return self.current_user();
        }

        let mut session = match UserSession::try_from(payload) {
            Ok(session) => session,
            Err(e) => {
                warn!("profile record invalid, keeping persisted session: {e}");
                return saved;
            }
        };

        if session.profile_photo.is_none() {
            session.profile_photo = saved.as_ref().and_then(|s| s.profile_photo.clone());
        }

        let transition = if self.is_authenticated() {
            SessionTransition::Updated
        } else {
            SessionTransition::SignedIn
        };
        self.inner.commit(Some(session.clone()), transition);
        Some(session)
    }

    /// Merge a partial update into the current session and re-persist.
    ///
    /// Silent no-op when no session is active.
    pub fn update_user(&self, patch: SessionPatch) {
        let updated = {
            let mut guard = self.inner.write();
            let Some(session) = guard.as_mut() else {
                return;
            };
            session.apply(patch);
            session.clone()
        };

        self.inner.persist(&updated);
        self.inner.broadcast.publish(SessionTransition::Updated);
    }

    /// Re-read the session from storage and broadcast any resulting
    /// transition.
    ///
    /// This is the hook for the external "storage changed" signal: another
    /// process sharing the profile may have signed in or out, and this
    /// consumer re-derives its state from what that process persisted.
    pub fn reload(&self) {
        let saved: Option<UserSession> = self.inner.storage.get(storage_keys::USER);

        let transition = {
            let mut guard = self.inner.write();
            let transition = match (guard.as_ref(), saved.as_ref()) {
                (None, Some(_)) => Some(SessionTransition::SignedIn),
                (Some(_), None) => Some(SessionTransition::SignedOut),
                (Some(old), Some(new)) if old != new => Some(SessionTransition::Updated),
                _ => None,
            };
            *guard = saved;
            transition
        };

        if let Some(transition) = transition {
            self.inner.begin_operation();
            self.inner.broadcast.publish(transition);
        }
    }
}

impl SessionInner {
    /// Advance the generation counter, invalidating in-flight completions.
    fn begin_operation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `generation` is still the newest auth operation.
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Persist, update memory, then broadcast - the ordering every
    /// state-changing operation must observe.
    fn commit(&self, session: Option<UserSession>, transition: SessionTransition) {
        if let Some(session) = &session {
            self.persist(session);
        }
        *self.write() = session;
        self.broadcast.publish(transition);
    }

    fn persist(&self, session: &UserSession) {
        if let Err(e) = self.storage.set(storage_keys::USER, session) {
            warn!("failed to persist session: {e}");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<UserSession>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<UserSession>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}
