//! Cart-facing error type.
//!
//! Nothing in this layer is fatal: the worst case is an empty cart or
//! random-fallback recommendations. `Display` strings are the short,
//! user-presentable form; diagnostic detail goes to `tracing` at the point
//! of failure and rides along in [`CartError::detail`].

use thiserror::Error;

/// Errors surfaced to callers of the cart engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// The remote cart could not be fetched, even after retries. The engine
    /// has fallen back to an empty in-memory cart.
    #[error("Failed to fetch cart. Please try again later.")]
    FetchFailed,

    /// The remote service rejected a cart mutation (or the request never
    /// reached it). The previous snapshot is left untouched.
    #[error("Could not update your cart. Please try again.")]
    Rejected {
        /// Diagnostic detail, not for display.
        detail: String,
    },
}

impl CartError {
    /// Diagnostic detail for logging, when the variant carries one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::FetchFailed => None,
            Self::Rejected { detail } => Some(detail),
        }
    }
}
