use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Secure random source unavailable: {0}")]
    SecureRandomUnavailable(String),
}
