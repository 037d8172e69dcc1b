//! Authentication state of a client.

use std::fmt;

use crate::credential::SessionCredential;

/// Phases of the login state machine.
///
/// `Authenticated` and `Failed` are terminal for a login attempt. A failed
/// client is unauthenticated again and the caller may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Unauthenticated,
    InFlight,
    Authenticated,
    Failed,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthPhase::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            AuthPhase::InFlight => write!(f, "AUTHENTICATION_IN_FLIGHT"),
            AuthPhase::Authenticated => write!(f, "AUTHENTICATED"),
            AuthPhase::Failed => write!(f, "FAILED"),
        }
    }
}

/// Credential slot of a client: either empty or fully populated.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Box<SessionCredential>),
}

impl SessionState {
    pub fn credential(&self) -> Option<&SessionCredential> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Authenticated(cred) => Some(cred),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn phase(&self) -> AuthPhase {
        match self {
            SessionState::Unauthenticated => AuthPhase::Unauthenticated,
            SessionState::Authenticated(_) => AuthPhase::Authenticated,
        }
    }

    /// Attach a credential. Only valid from `Unauthenticated`.
    pub(crate) fn attach(&mut self, credential: SessionCredential) {
        tracing::info!(from = %self.phase(), to = %AuthPhase::Authenticated, "State transition");
        *self = SessionState::Authenticated(Box::new(credential));
    }

    /// Drop the credential, if any.
    pub(crate) fn discard(&mut self) -> Option<SessionCredential> {
        match std::mem::take(self) {
            SessionState::Unauthenticated => None,
            SessionState::Authenticated(cred) => Some(*cred),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::tests::sample_credential;

    #[test]
    fn test_attach_and_discard() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), AuthPhase::Unauthenticated);
        assert!(state.credential().is_none());

        state.attach(sample_credential());
        assert!(state.is_authenticated());
        assert_eq!(state.phase(), AuthPhase::Authenticated);
        assert_eq!(state.credential().unwrap().account_id(), "user@example.com");

        let cred = state.discard().unwrap();
        assert_eq!(cred.account_numeric_id(), "12345");
        assert!(!state.is_authenticated());
        assert!(state.discard().is_none());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(AuthPhase::InFlight.to_string(), "AUTHENTICATION_IN_FLIGHT");
    }
}
