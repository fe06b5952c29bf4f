//! Cart state synchronization.
//!
//! # Architecture
//!
//! Two authorities can own the cart: the persistent local store (guest
//! sessions) and the remote cart service (authenticated sessions). Both sit
//! behind the [`CartRepository`] trait so the engine's reconciliation logic
//! is authority-agnostic: every operation returns the resulting full
//! snapshot, and the engine replaces its in-memory state wholesale.
//!
//! The two authorities never read each other's state - all cross-authority
//! movement (the login-time merge) passes through the engine.

mod engine;
mod repository;

pub use engine::CartSyncEngine;
pub use repository::{CartRepository, LocalRepository, RemoteRepository, RetryPolicy};
