//! TicketLive storefront client library.
//!
//! This crate is the client-resident core of the TicketLive event-ticketing
//! site: the authentication session, the shopping cart, and the event
//! catalog client. Every hard problem (persistence of accounts, credential
//! verification, inventory, payment) lives behind the remote REST API this
//! crate calls - the collaborator endpoints are the source of truth, and
//! this crate keeps a best-effort local view of them.
//!
//! # Architecture
//!
//! - [`services::SessionManager`] - single source of truth for "who is
//!   logged in"; persists the session to local storage and broadcasts every
//!   transition so independently-constructed consumers stay consistent.
//! - [`services::CartManager`] - the pending ticket selections; enforces the
//!   per-event quantity ceiling and clears itself whenever the session
//!   signs out.
//! - [`api::ApiClient`] - the collaborator boundary (`/auth/*`,
//!   `/users/profile`, `/events`) over `reqwest`, with a `moka`-cached
//!   catalog.
//! - [`storage::LocalStorage`] - per-profile key-value persistence standing
//!   in for browser local storage.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod broadcast;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;
