use async_trait::async_trait;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated email and a plaintext password or credential record
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `SecureRandomUnavailable` - Password could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve all registered users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `email` - Claimed identity
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// The user and a signed access token for it
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (never distinguished)
    /// * `TokenIssuance` - Token generation failed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError>;

    /// Resolve a bearer token to the current state of its user.
    ///
    /// # Arguments
    /// * `token` - Bearer token presented by the client
    ///
    /// # Returns
    /// User the token was issued for
    ///
    /// # Errors
    /// * `Unauthenticated` - Token invalid or expired, or the user no longer exists
    /// * `AccountDisabled` - User exists but is disabled
    /// * `DatabaseError` - Database operation failed
    async fn resolve_session(&self, token: &str) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Arguments
    /// * `user` - User entity to create
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Arguments
    /// * `email` - Email address string
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Replace the stored credential of a user.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `credential` - New credential record
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_credential(&self, id: &UserId, credential: &str) -> Result<(), UserError>;
}
