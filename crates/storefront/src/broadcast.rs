//! Typed session-change broadcast.
//!
//! The process-wide "authentication changed" signal. Consumers that cannot
//! share an in-memory instance (a navigation bar constructed apart from a
//! page-level provider, the cart manager, a test harness) subscribe here and
//! re-read state when notified - the signal itself carries no payload.
//!
//! Dispatch is synchronous: a publisher returns only after every live
//! observer has run, so an observer always finds local storage already
//! updated by the operation that triggered it.

use std::sync::{PoisonError, RwLock, Weak};

/// A session state transition.
///
/// Deliberately payload-free: observers re-read the session manager (or
/// storage) rather than trusting a snapshot that may already be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    /// Anonymous -> Authenticated.
    SignedIn,
    /// Authenticated -> Anonymous.
    SignedOut,
    /// Authenticated -> Authenticated with changed fields.
    Updated,
}

/// An observer of session transitions.
pub trait SessionObserver: Send + Sync {
    /// Called synchronously after the transition has been persisted.
    fn session_changed(&self, transition: SessionTransition);
}

/// Observer implementation for plain closures.
struct FnObserver<F>(F);

impl<F> SessionObserver for FnObserver<F>
where
    F: Fn(SessionTransition) + Send + Sync,
{
    fn session_changed(&self, transition: SessionTransition) {
        (self.0)(transition);
    }
}

/// Keeps a closure subscription alive; dropping it unsubscribes.
pub struct Subscription {
    _observer: std::sync::Arc<dyn SessionObserver>,
}

/// Registry of weakly-held observers.
///
/// Observers are held as `Weak` so a dropped consumer silently falls out of
/// the fan-out instead of leaking or requiring explicit unsubscription.
pub(crate) struct SessionBroadcast {
    observers: RwLock<Vec<Weak<dyn SessionObserver>>>,
}

impl SessionBroadcast {
    pub(crate) fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub(crate) fn subscribe(&self, observer: Weak<dyn SessionObserver>) {
        self.write().push(observer);
    }

    /// Register a closure observer, returning the guard that keeps it alive.
    pub(crate) fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(SessionTransition) + Send + Sync + 'static,
    {
        let observer: std::sync::Arc<dyn SessionObserver> = std::sync::Arc::new(FnObserver(f));
        self.subscribe(std::sync::Arc::downgrade(&observer));
        Subscription {
            _observer: observer,
        }
    }

    /// Notify every live observer, pruning dropped ones.
    ///
    /// The registry lock is released before observers run, so an observer
    /// may itself subscribe or publish without deadlocking.
    pub(crate) fn publish(&self, transition: SessionTransition) {
        let live: Vec<_> = {
            let mut observers = self.write();
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        for observer in live {
            observer.session_changed(transition);
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Weak<dyn SessionObserver>>> {
        self.observers.write().unwrap_or_else(PoisonError::into_inner)
    }
}
