//! Domain models for the storefront client.
//!
//! - [`session`] - The authenticated-user record and its storage keys
//! - [`event`] - Catalog records as delivered by the events collaborator
//! - [`cart`] - Cart lines and the pure quantity state machine

pub mod cart;
pub mod event;
pub mod session;

pub use cart::{Cart, CartLine, CartOutcome, MAX_TICKETS_PER_EVENT};
pub use event::Event;
pub use session::{SessionPatch, UserSession};
