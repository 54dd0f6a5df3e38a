//! Identity verification used by the login step

use tracing::debug;

use crate::error::SessionError;

/// Decides whether a typed credential logs the student in
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, student_id: &str, credential: &str) -> Result<(), SessionError>;
}

/// Accepts any non-empty credential
#[derive(Debug, Clone, Copy, Default)]
pub struct MockVerifier;

impl CredentialVerifier for MockVerifier {
    fn verify(&self, student_id: &str, credential: &str) -> Result<(), SessionError> {
        if credential.is_empty() {
            return Err(SessionError::EmptyCredential);
        }
        debug!("Accepting credential for student {}", student_id);
        Ok(())
    }
}
