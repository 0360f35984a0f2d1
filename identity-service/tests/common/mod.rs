use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use identity_service::config::Config;
use identity_service::config::DatabaseConfig;
use identity_service::config::JwtConfig;
use identity_service::config::PasswordConfig;
use identity_service::config::ServerConfig;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::user::errors::UserError;
use tokio::sync::RwLock;

/// Repository keeping users in memory, keyed by email
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub async fn insert(&self, user: User) {
        self.users
            .write()
            .await
            .insert(user.email.as_str().to_string(), user);
    }

    pub async fn remove(&self, email: &str) {
        self.users.write().await.remove(email);
    }

    pub async fn set_disabled(&self, email: &str, disabled: bool) {
        if let Some(user) = self.users.write().await.get_mut(email) {
            user.disabled = disabled;
        }
    }

    pub async fn get(&self, email: &str) -> Option<User> {
        self.users.read().await.get(email).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.contains_key(user.email.as_str()) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.email.as_str().to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn update_credential(&self, id: &UserId, credential: &str) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|user| user.id == *id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.credential = credential.to_string();
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let config = Config {
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
            },
            server: ServerConfig { http_port: port },
            jwt: JwtConfig {
                secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".to_string(),
                expiration_minutes: 30,
            },
            password: PasswordConfig { iterations: 1_000 },
        };
        config.validate().expect("Invalid test configuration");

        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(config.authenticator());
        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));

        let app = create_router(user_service);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to run test server");
        });

        Self {
            address,
            repository,
            authenticator,
            api_client: reqwest::Client::new(),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Register a user through the API
    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/users")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Request an access token through the OAuth2 password form
    pub async fn request_token(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/token")
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a user and return a fresh access token for it
    pub async fn login(&self, email: &str, password: &str) -> String {
        self.register(email, password).await;
        let body: serde_json::Value = self
            .request_token(email, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");

        body["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}
