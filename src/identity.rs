//! Identity collaborator
//!
//! The relay never checks who a user really is. Credential verification
//! belongs to an external identity service plugged in through
//! [`IdentityVerifier`]; the relay only consumes the user ID it returns.

use std::future::Future;

/// Error returned when a credential is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No credential supplied
    MissingCredential,
    /// Verifier refused the credential
    Rejected(String),
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityError::MissingCredential => write!(f, "missing credential"),
            IdentityError::Rejected(reason) => write!(f, "credential rejected: {}", reason),
        }
    }
}

impl std::error::Error for IdentityError {}

/// Pluggable credential verification
///
/// # Example
///
/// ```ignore
/// struct TokenService { /* client for the real identity backend */ }
///
/// impl IdentityVerifier for TokenService {
///     async fn verify(&self, credential: &str) -> Result<String, IdentityError> {
///         self.lookup(credential).await.ok_or(IdentityError::Rejected("unknown token".into()))
///     }
/// }
/// ```
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Map a caller-supplied credential to a verified user ID
    fn verify(&self, credential: &str)
        -> impl Future<Output = Result<String, IdentityError>> + Send;
}

/// Verifier that trusts the credential as the user ID
///
/// Use only where the surrounding channel already authenticated the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedIdentity;

impl IdentityVerifier for TrustedIdentity {
    async fn verify(&self, credential: &str) -> Result<String, IdentityError> {
        if credential.is_empty() {
            return Err(IdentityError::MissingCredential);
        }
        Ok(credential.to_string())
    }
}
