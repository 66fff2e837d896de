//! TicketLive Core - Shared types library.
//!
//! This crate provides common types used across all TicketLive client
//! components:
//! - `storefront` - Session, cart, and catalog client library
//! - `cli` - Command-line storefront consumer
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
