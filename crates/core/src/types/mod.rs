//! Core types for GreenGrocer.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;
pub mod session;

pub use cart::{CartTotals, LineItem, LineItemError, cart_totals};
pub use id::*;
pub use product::Product;
pub use session::SessionState;
