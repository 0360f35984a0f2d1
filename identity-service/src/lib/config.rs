use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Shortest accepted token signing secret (HS256 key size).
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

// Keeps the secret out of startup logs.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}

fn default_expiration_minutes() -> i64 {
    auth::jwt::DEFAULT_TOKEN_TTL_MINUTES
}

fn default_iterations() -> u32 {
    auth::password::DEFAULT_ITERATIONS
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// There is no fallback for `jwt.secret`: a missing or weak secret fails here.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the service must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        if self.jwt.expiration_minutes <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_minutes must be positive".to_string(),
            ));
        }

        if self.password.iterations == 0 {
            return Err(ConfigError::Message(
                "password.iterations must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the authenticator described by this configuration.
    pub fn authenticator(&self) -> auth::Authenticator {
        auth::Authenticator::new(self.jwt.secret.as_bytes())
            .with_iterations(self.password.iterations)
            .with_token_ttl(chrono::Duration::minutes(self.jwt.expiration_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgres://localhost/identity".to_string(),
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_minutes: default_expiration_minutes(),
            },
            password: PasswordConfig::default(),
        }
    }

    #[test]
    fn test_validate_accepts_strong_secret() {
        assert!(config("test-secret-key-for-jwt-signing-at-least-32-bytes")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_or_short_secret() {
        assert!(config("").validate().is_err());
        assert!(config("secret").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_lifetime() {
        let mut config = config("test-secret-key-for-jwt-signing-at-least-32-bytes");
        config.jwt.expiration_minutes = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = config("test-secret-key-for-jwt-signing-at-least-32-bytes");

        assert_eq!(config.jwt.expiration_minutes, 30);
        assert_eq!(config.password.iterations, 100_000);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = config("test-secret-key-for-jwt-signing-at-least-32-bytes");

        let printed = format!("{:?}", config);
        assert!(!printed.contains("test-secret-key"));
    }

    #[test]
    fn test_authenticator_uses_configured_lifetime() {
        let mut config = config("test-secret-key-for-jwt-signing-at-least-32-bytes");
        config.jwt.expiration_minutes = 10;

        let authenticator = config.authenticator();
        assert_eq!(
            authenticator.token_issuer().default_ttl(),
            chrono::Duration::minutes(10)
        );
    }
}
