use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AccessToken;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Password hashing and verification run on the blocking thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Credential and token core built from configuration
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Hash a legacy plaintext credential and persist the record.
    async fn upgrade_credential(&self, mut user: User) -> Result<User, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let plaintext = user.credential.clone();
        let credential =
            run_blocking(move || Ok(authenticator.hash_password(&plaintext)?)).await?;

        self.repository
            .update_credential(&user.id, &credential)
            .await?;
        tracing::warn!(user_id = %user.id, "Upgraded plaintext credential to hashed record");

        user.credential = credential;
        Ok(user)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let credential =
            run_blocking(move || Ok(authenticator.hash_if_needed(&password)?)).await?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            credential,
            disabled: false,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError> {
        let user = match self.repository.find_by_email(email).await? {
            Some(user) if !Authenticator::is_hashed(&user.credential) => {
                Some(self.upgrade_credential(user).await?)
            }
            found => found,
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let user = run_blocking(move || Ok(authenticator.check_credentials(user, &password)?))
            .await
            .inspect_err(|_| tracing::warn!("Login rejected"))?;

        let token = self.authenticator.issue_token(&user)?;
        tracing::info!(user_id = %user.id, "Access token issued");

        Ok(AccessToken { user, token })
    }

    async fn resolve_session(&self, token: &str) -> Result<User, UserError> {
        let subject = self.authenticator.token_subject(token)?;
        let user = self.repository.find_by_email(&subject).await?;

        Ok(self.authenticator.admit(user)?)
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, UserError>
where
    F: FnOnce() -> Result<T, UserError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| UserError::Unknown(format!("Blocking task failed: {}", e)))?
}
