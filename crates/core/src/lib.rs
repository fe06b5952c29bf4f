//! GreenGrocer Core - Shared domain types.
//!
//! This crate provides the common types used across GreenGrocer components:
//! - `commerce` - Cart synchronization and recommendation layer
//! - storefront surfaces built on top of it
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, cart line items and totals, session state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
