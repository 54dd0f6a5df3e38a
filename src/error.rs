//! Error types for session operations

use thiserror::Error;

use crate::state::{Action, Phase};

/// Errors surfaced by session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The action has no transition from the current phase
    #[error("{action} is not allowed while {phase}")]
    InvalidAction { action: Action, phase: Phase },

    /// Login was requested before anything was typed
    #[error("credential buffer is empty")]
    EmptyCredential,

    /// The identity verifier refused the credential
    #[error("credential rejected: {0}")]
    CredentialRejected(String),

    /// A previous holder of the session lock panicked
    #[error("session state lock poisoned")]
    StatePoisoned,
}

impl SessionError {
    /// Whether the error is a refusal of the caller's request rather than
    /// an internal fault
    pub fn is_rejection(&self) -> bool {
        !matches!(self, SessionError::StatePoisoned)
    }
}
