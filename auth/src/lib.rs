//! Authentication utilities library
//!
//! Credential and token core of the identity service:
//! - Password hashing (PBKDF2-HMAC-SHA512, self-describing records)
//! - Signed, expiring access tokens (HS256 JWT)
//! - Authentication and session resolution flows over a caller-supplied lookup
//!
//! Nothing here holds global state: secrets and work factors are passed in
//! at construction, and user storage stays with the caller.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new().with_iterations(1_000);
//! let record = hasher.hash("my_password").unwrap();
//! assert!(PasswordHasher::is_hashed(&record));
//! assert!(hasher.verify(&record, "my_password"));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!");
//! let token = issuer.issue("a@b.com", None).unwrap();
//! assert_eq!(issuer.verify(&token).unwrap(), "a@b.com");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{AccountRecord, Authenticator};
//!
//! struct Account {
//!     email: String,
//!     credential: String,
//! }
//!
//! impl AccountRecord for Account {
//!     fn email(&self) -> &str {
//!         &self.email
//!     }
//!
//!     fn credential(&self) -> &str {
//!         &self.credential
//!     }
//! }
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!").with_iterations(1_000);
//!
//! // Register: hash password
//! let credential = auth.hash_password("password123").unwrap();
//! let lookup = |email: &str| {
//!     (email == "a@b.com").then(|| Account {
//!         email: email.to_string(),
//!         credential: credential.clone(),
//!     })
//! };
//!
//! // Login: verify and generate token
//! let result = auth.login(lookup, "a@b.com", "password123").unwrap();
//!
//! // Resolve the session on a later request
//! let account = auth.resolve(lookup, &result.access_token).unwrap();
//! assert_eq!(account.email, "a@b.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AccountRecord;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use password::PasswordError;
pub use password::PasswordHasher;
