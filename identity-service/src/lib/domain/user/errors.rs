use auth::AuthenticationError;
use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Inactive user")]
    AccountDisabled,

    // Infrastructure errors
    #[error("Secure random source unavailable: {0}")]
    SecureRandomUnavailable(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<AuthenticationError> for UserError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
            AuthenticationError::Unauthenticated => UserError::Unauthenticated,
            AuthenticationError::AccountDisabled => UserError::AccountDisabled,
            AuthenticationError::SecureRandomUnavailable(msg) => {
                UserError::SecureRandomUnavailable(msg)
            }
            AuthenticationError::TokenIssuance(e) => UserError::TokenIssuance(e.to_string()),
        }
    }
}
