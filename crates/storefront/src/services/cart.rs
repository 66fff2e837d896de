//! Cart manager.
//!
//! Maintains the authenticated user's pending ticket selections. The pure
//! quantity rules live in [`Cart`]; this manager layers on the session
//! guard, persistence, and the observer relationship with the session
//! manager - the only sanctioned channel between the two: whenever the
//! session transitions to anonymous (including absence at startup), the
//! cart is cleared before any other cart operation is observable.
//!
//! Rule violations are not errors. Every mutation reports a [`CartNotice`]
//! the UI renders as a transient message; the operation itself is a guarded
//! no-op when refused.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::{debug, warn};

use ticketlive_core::{EventId, Price};

use crate::broadcast::{SessionObserver, SessionTransition};
use crate::models::cart::{Cart, CartLine, CartOutcome};
use crate::models::event::Event;
use crate::models::session::storage_keys;
use crate::services::session::SessionManager;
use crate::storage::LocalStorage;

/// A transient user-facing message from a cart mutation.
///
/// Distinct from an error: the mutation either succeeded or was a sanctioned
/// no-op, and the notice is what the UI shows either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartNotice {
    /// A new line was created.
    Added,
    /// Another ticket was added to an existing line.
    Incremented,
    /// The line already holds the maximum tickets; nothing changed.
    QuantityLimitReached,
    /// No user is signed in; the cart was left untouched.
    NotAuthenticated,
}

impl CartNotice {
    /// The message the UI renders.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Added => "Ticket added to your cart",
            Self::Incremented => "Added another ticket",
            Self::QuantityLimitReached => "A user cannot buy more than 6 tickets per event",
            Self::NotAuthenticated => "You must be signed in to add tickets to your cart",
        }
    }
}

impl std::fmt::Display for CartNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// The cart manager.
///
/// Cheaply cloneable; all clones share the same cart. Construct it after
/// the session manager - it subscribes to session transitions and reads the
/// authenticated flag, nothing more.
#[derive(Clone)]
pub struct CartManager {
    inner: Arc<CartInner>,
}

struct CartInner {
    storage: LocalStorage,
    session: SessionManager,
    cart: RwLock<Cart>,
}

impl CartManager {
    /// Create a cart manager, hydrating persisted lines when a session is
    /// active and clearing any stale persisted cart when it is not.
    #[must_use]
    pub fn new(storage: LocalStorage, session: &SessionManager) -> Self {
        let cart = if session.is_authenticated() {
            storage
                .get::<Vec<CartLine>>(storage_keys::CART)
                .map(Cart::from_lines)
                .unwrap_or_default()
        } else {
            Cart::new()
        };

        let inner = Arc::new(CartInner {
            storage,
            session: session.clone(),
            cart: RwLock::new(cart),
        });

        // Anonymous at startup: the persisted cart (if any) is stale
        if !inner.session.is_authenticated() {
            inner.erase();
        }

        let inner_dyn: Arc<dyn SessionObserver> = inner.clone();
        let observer: Weak<dyn SessionObserver> = Arc::downgrade(&inner_dyn);
        session.subscribe(observer);

        Self { inner }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one ticket for `event`.
    ///
    /// Refused with [`CartNotice::NotAuthenticated`] when no session is
    /// active and with [`CartNotice::QuantityLimitReached`] at the per-event
    /// ceiling; in both cases the cart is untouched.
    pub fn add_to_cart(&self, event: &Event) -> CartNotice {
        if !self.inner.session.is_authenticated() {
            debug!("add_to_cart refused: no session");
            return CartNotice::NotAuthenticated;
        }

        let outcome = {
            let mut cart = self.inner.write();
            cart.add(event)
        };

        match outcome {
            CartOutcome::Added => {
                self.inner.persist();
                CartNotice::Added
            }
            CartOutcome::Incremented => {
                self.inner.persist();
                CartNotice::Incremented
            }
            CartOutcome::LimitReached => CartNotice::QuantityLimitReached,
        }
    }

    /// Add one ticket to the existing line for `event_id`.
    ///
    /// Returns `None` when no such line exists (a no-op).
    pub fn increase_quantity(&self, event_id: EventId) -> Option<CartNotice> {
        let outcome = {
            let mut cart = self.inner.write();
            cart.increase(event_id)?
        };

        match outcome {
            CartOutcome::LimitReached => Some(CartNotice::QuantityLimitReached),
            _ => {
                self.inner.persist();
                Some(CartNotice::Incremented)
            }
        }
    }

    /// Remove one ticket from the line for `event_id`; the line disappears
    /// at zero. No-op when no such line exists.
    pub fn decrease_quantity(&self, event_id: EventId) {
        let changed = {
            let mut cart = self.inner.write();
            cart.decrease(event_id)
        };
        if changed {
            self.inner.persist();
        }
    }

    /// Remove the line for `event_id` entirely, if present.
    pub fn remove_from_cart(&self, event_id: EventId) {
        let changed = {
            let mut cart = self.inner.write();
            cart.remove(event_id)
        };
        if changed {
            self.inner.persist();
        }
    }

    /// Empty the cart and clear its persisted record.
    pub fn clear_cart(&self) {
        self.inner.erase();
    }

    // =========================================================================
    // Views (always recomputed, never stored)
    // =========================================================================

    /// Sum of `price * quantity` over all lines; zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.inner.read().total()
    }

    /// Sum of all quantities; zero for an empty cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner.read().item_count()
    }

    /// The event ids currently in the cart, in display order.
    #[must_use]
    pub fn line_ids(&self) -> Vec<EventId> {
        self.inner.read().line_ids()
    }

    /// A snapshot of the lines in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.inner.read().lines().to_vec()
    }
}

impl CartInner {
    /// Rewrite the persisted lines from the in-memory cart.
    fn persist(&self) {
        let lines = self.read().lines().to_vec();
        if let Err(e) = self.storage.set(storage_keys::CART, &lines) {
            warn!("failed to persist cart: {e}");
        }
    }

    /// Empty the cart and remove the persisted record.
    fn erase(&self) {
        self.write().clear();
        if let Err(e) = self.storage.remove(storage_keys::CART) {
            warn!("failed to clear persisted cart: {e}");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Cart> {
        self.cart.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Cart> {
        self.cart.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionObserver for CartInner {
    fn session_changed(&self, transition: SessionTransition) {
        if transition == SessionTransition::SignedOut {
            debug!("session signed out, clearing cart");
            self.erase();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::{AuthMode, StorefrontConfig};
    use crate::models::cart::MAX_TICKETS_PER_EVENT;
    use crate::models::session::UserSession;
    use ticketlive_core::{Email, UserId};

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            api_url: url::Url::parse("http://localhost:3001").unwrap(),
            auth_mode: AuthMode::Bearer,
            storage_path: std::path::PathBuf::from("unused.json"),
        }
    }

    fn session_record() -> UserSession {
        UserSession {
            id: UserId::from("u-1"),
            email: Email::parse("ana@example.com").unwrap(),
            name: "Ana".to_string(),
            is_admin: false,
            phone: None,
            address: None,
            profile_photo: None,
            birthday: None,
        }
    }

    /// A session manager hydrated from a pre-seeded (signed-in) storage.
    fn signed_in_session(storage: &LocalStorage) -> SessionManager {
        storage.set(storage_keys::USER, &session_record()).unwrap();
        let config = test_config();
        let api = ApiClient::new(&config).unwrap();
        SessionManager::new(api, storage.clone(), config.auth_mode)
    }

    fn anonymous_session(storage: &LocalStorage) -> SessionManager {
        let config = test_config();
        let api = ApiClient::new(&config).unwrap();
        SessionManager::new(api, storage.clone(), config.auth_mode)
    }

    fn event(id: i32, price: i64) -> Event {
        Event {
            id: EventId::new(id),
            title: format!("Evento {id}"),
            description: String::new(),
            date: "2026-09-12T20:00:00Z".parse().unwrap(),
            time: "20:00".to_string(),
            location: "Foro Central".to_string(),
            capacity: 100,
            price: Price::from_major(price),
            image_url: String::new(),
            status: true,
            category: "Musica".to_string(),
        }
    }

    #[test]
    fn test_add_refused_while_anonymous() {
        let storage = LocalStorage::in_memory();
        let session = anonymous_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);

        assert_eq!(cart.add_to_cart(&event(1, 250)), CartNotice::NotAuthenticated);
        assert_eq!(cart.item_count(), 0);
        assert!(!storage.contains(storage_keys::CART));
    }

    #[test]
    fn test_add_caps_at_six_with_notice() {
        let storage = LocalStorage::in_memory();
        let session = signed_in_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);
        let e = event(1, 250);

        assert_eq!(cart.add_to_cart(&e), CartNotice::Added);
        for _ in 1..MAX_TICKETS_PER_EVENT {
            assert_eq!(cart.add_to_cart(&e), CartNotice::Incremented);
        }
        assert_eq!(cart.add_to_cart(&e), CartNotice::QuantityLimitReached);

        assert_eq!(cart.item_count(), MAX_TICKETS_PER_EVENT);
        assert_eq!(cart.total(), Price::from_major(250).times(MAX_TICKETS_PER_EVENT));
        assert_eq!(cart.line_ids(), vec![e.id]);
    }

    #[test]
    fn test_logout_clears_cart_and_persisted_record() {
        let storage = LocalStorage::in_memory();
        let session = signed_in_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);

        cart.add_to_cart(&event(1, 250));
        cart.add_to_cart(&event(2, 100));
        assert!(storage.contains(storage_keys::CART));

        session.logout();

        // Cleared synchronously, before logout() returned
        assert_eq!(cart.item_count(), 0);
        assert!(!storage.contains(storage_keys::CART));
    }

    #[test]
    fn test_stale_persisted_cart_cleared_when_anonymous_at_startup() {
        let storage = LocalStorage::in_memory();
        storage
            .set(
                storage_keys::CART,
                &vec![CartLine {
                    event: event(1, 250),
                    quantity: 2,
                }],
            )
            .unwrap();

        let session = anonymous_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);

        assert_eq!(cart.item_count(), 0);
        assert!(!storage.contains(storage_keys::CART));
    }

    #[test]
    fn test_persisted_cart_rehydrates_for_signed_in_user() {
        let storage = LocalStorage::in_memory();
        let session = signed_in_session(&storage);

        {
            let cart = CartManager::new(storage.clone(), &session);
            cart.add_to_cart(&event(1, 250));
            cart.add_to_cart(&event(1, 250));
            cart.add_to_cart(&event(2, 100));
        }

        // A fresh manager over the same storage sees the same lines
        let cart = CartManager::new(storage.clone(), &session);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_major(600));
        assert_eq!(cart.line_ids(), vec![EventId::new(1), EventId::new(2)]);
    }

    #[test]
    fn test_increase_and_decrease() {
        let storage = LocalStorage::in_memory();
        let session = signed_in_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);
        let e = event(1, 250);

        cart.add_to_cart(&e);
        assert_eq!(cart.increase_quantity(e.id), Some(CartNotice::Incremented));
        assert_eq!(cart.item_count(), 2);

        // Absent line: no-op, no notice
        assert_eq!(cart.increase_quantity(EventId::new(99)), None);

        cart.decrease_quantity(e.id);
        cart.decrease_quantity(e.id);
        assert_eq!(cart.item_count(), 0);
        assert!(cart.line_ids().is_empty());

        // Decreasing an absent line stays a no-op
        cart.decrease_quantity(e.id);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_increase_reports_limit() {
        let storage = LocalStorage::in_memory();
        let session = signed_in_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);
        let e = event(1, 250);

        for _ in 0..MAX_TICKETS_PER_EVENT {
            cart.add_to_cart(&e);
        }

        assert_eq!(
            cart.increase_quantity(e.id),
            Some(CartNotice::QuantityLimitReached)
        );
        assert_eq!(cart.item_count(), MAX_TICKETS_PER_EVENT);
    }

    #[test]
    fn test_remove_and_clear() {
        let storage = LocalStorage::in_memory();
        let session = signed_in_session(&storage);
        let cart = CartManager::new(storage.clone(), &session);

        cart.add_to_cart(&event(1, 250));
        cart.add_to_cart(&event(2, 100));

        cart.remove_from_cart(EventId::new(1));
        assert_eq!(cart.line_ids(), vec![EventId::new(2)]);

        cart.clear_cart();
        assert_eq!(cart.item_count(), 0);
        assert!(!storage.contains(storage_keys::CART));
    }
}
