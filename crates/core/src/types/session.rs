//! Session state as observed from the authentication collaborator.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// Authentication state of the current session.
///
/// Owned by the external authentication layer; the cart engine only observes
/// transitions of this value and never drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Unauthenticated session; the cart lives in local storage.
    Guest,
    /// Session tied to an identity; the remote cart service is authoritative.
    Authenticated {
        /// Opaque customer reference.
        customer: CustomerId,
    },
}

impl SessionState {
    /// Whether the session is tied to an identity.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The customer reference, if authenticated.
    #[must_use]
    pub const fn customer(&self) -> Option<CustomerId> {
        match self {
            Self::Guest => None,
            Self::Authenticated { customer } => Some(*customer),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Guest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_is_not_authenticated() {
        assert!(!SessionState::Guest.is_authenticated());
        assert_eq!(SessionState::Guest.customer(), None);
    }

    #[test]
    fn test_authenticated_exposes_customer() {
        let session = SessionState::Authenticated {
            customer: CustomerId::new(9),
        };
        assert!(session.is_authenticated());
        assert_eq!(session.customer(), Some(CustomerId::new(9)));
    }
}
