use chrono::Duration;

use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Record verified against when no account matches, so a miss costs one KDF
/// run just like a wrong password.
const ABSENT_ACCOUNT_RECORD: &str = "__hash__0000000000000000000000000000000000000000000000000000000000000000\
00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

/// View of a stored user record needed by the authentication flows.
///
/// Services implement this for their own user entity.
pub trait AccountRecord {
    /// Unique identity, also used as token subject.
    fn email(&self) -> &str;

    /// Stored credential record.
    fn credential(&self) -> &str;

    /// Whether the account may start a session.
    fn is_active(&self) -> bool {
        true
    }
}

/// Authentication coordinator combining password verification and token handling.
///
/// Holds no request state; share it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

/// Result of a successful login.
#[derive(Debug)]
pub struct AuthenticationResult<R> {
    /// Authenticated account
    pub record: R,

    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Secure random source unavailable: {0}")]
    SecureRandomUnavailable(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(TokenError),
}

impl From<PasswordError> for AuthenticationError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::SecureRandomUnavailable(msg) => {
                AuthenticationError::SecureRandomUnavailable(msg)
            }
        }
    }
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `token_secret` - Secret key for token signing
    ///
    /// # Returns
    /// Authenticator with default KDF work factor and token lifetime
    pub fn new(token_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(token_secret),
        }
    }

    /// Set the PBKDF2 iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.password_hasher = self.password_hasher.with_iterations(iterations);
        self
    }

    /// Set the default access token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_issuer = self.token_issuer.with_default_ttl(ttl);
        self
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.token_issuer
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `SecureRandomUnavailable` - No trustworthy random source
    pub fn hash_password(&self, password: &str) -> Result<String, AuthenticationError> {
        Ok(self.password_hasher.hash(password)?)
    }

    /// Hash a password for storage unless it already is a credential record.
    ///
    /// # Errors
    /// * `SecureRandomUnavailable` - No trustworthy random source
    pub fn hash_if_needed(&self, value: &str) -> Result<String, AuthenticationError> {
        Ok(self.password_hasher.hash_if_needed(value)?)
    }

    pub fn is_hashed(value: &str) -> bool {
        PasswordHasher::is_hashed(value)
    }

    /// Look up an account by email and verify its password.
    ///
    /// # Arguments
    /// * `lookup` - Point lookup by email supplied by the caller's store
    /// * `email` - Claimed identity
    /// * `password` - Plaintext password to verify
    ///
    /// # Returns
    /// The matching record
    ///
    /// # Errors
    /// * `InvalidCredentials` - No such account or wrong password
    pub fn authenticate<R, F>(
        &self,
        lookup: F,
        email: &str,
        password: &str,
    ) -> Result<R, AuthenticationError>
    where
        R: AccountRecord,
        F: FnOnce(&str) -> Option<R>,
    {
        self.check_credentials(lookup(email), password)
    }

    /// Verify a password against an already fetched record.
    ///
    /// Callers with asynchronous stores fetch first and hand the result here.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Record is absent or the password does not match
    pub fn check_credentials<R>(
        &self,
        record: Option<R>,
        password: &str,
    ) -> Result<R, AuthenticationError>
    where
        R: AccountRecord,
    {
        match record {
            Some(record) if self.password_hasher.verify(record.credential(), password) => {
                Ok(record)
            }
            Some(record) => {
                tracing::debug!(email = %record.email(), "Password mismatch");
                Err(AuthenticationError::InvalidCredentials)
            }
            None => {
                self.password_hasher.verify(ABSENT_ACCOUNT_RECORD, password);
                Err(AuthenticationError::InvalidCredentials)
            }
        }
    }

    /// Issue an access token for an authenticated record.
    ///
    /// # Errors
    /// * `TokenIssuance` - Token generation failed
    pub fn issue_token<R: AccountRecord>(&self, record: &R) -> Result<String, AuthenticationError> {
        self.token_issuer
            .issue(record.email(), None)
            .map_err(AuthenticationError::TokenIssuance)
    }

    /// Verify credentials and generate an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No such account or wrong password
    /// * `TokenIssuance` - Token generation failed
    pub fn login<R, F>(
        &self,
        lookup: F,
        email: &str,
        password: &str,
    ) -> Result<AuthenticationResult<R>, AuthenticationError>
    where
        R: AccountRecord,
        F: FnOnce(&str) -> Option<R>,
    {
        let record = self.authenticate(lookup, email, password)?;
        let access_token = self.issue_token(&record)?;

        Ok(AuthenticationResult {
            record,
            access_token,
        })
    }

    /// Resolve a bearer token to the account it was issued for.
    ///
    /// # Arguments
    /// * `lookup` - Point lookup by email supplied by the caller's store
    /// * `token` - Bearer token presented by the client
    ///
    /// # Returns
    /// The current record of the token subject
    ///
    /// # Errors
    /// * `Unauthenticated` - Token invalid, expired, or its account is gone
    /// * `AccountDisabled` - Account exists but is not active
    pub fn resolve<R, F>(&self, lookup: F, token: &str) -> Result<R, AuthenticationError>
    where
        R: AccountRecord,
        F: FnOnce(&str) -> Option<R>,
    {
        let subject = self.token_subject(token)?;
        self.admit(lookup(&subject))
    }

    /// Verify a token and return its subject.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token invalid, malformed or expired
    pub fn token_subject(&self, token: &str) -> Result<String, AuthenticationError> {
        self.token_issuer.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AuthenticationError::Unauthenticated
        })
    }

    /// Apply account policy to the record re-fetched for a token subject.
    ///
    /// # Errors
    /// * `Unauthenticated` - Account no longer exists
    /// * `AccountDisabled` - Account exists but is not active
    pub fn admit<R: AccountRecord>(&self, record: Option<R>) -> Result<R, AuthenticationError> {
        let record = record.ok_or(AuthenticationError::Unauthenticated)?;

        if !record.is_active() {
            return Err(AuthenticationError::AccountDisabled);
        }

        Ok(record)
    }
}
