use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Lifetime applied when `issue` is called without an explicit ttl.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Issues and verifies signed access tokens.
///
/// Tokens are compact HS256 JWTs carrying `sub`, `iat` and `exp`, so any
/// standard JWT library holding the same secret can verify them.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Returns
    /// TokenIssuer configured with HS256 and a 30 minute default lifetime
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration, never from code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            default_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Override the lifetime used when no ttl is given.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a signed token for `subject`.
    ///
    /// # Arguments
    /// * `subject` - Identity to bind into the token
    /// * `ttl` - Lifetime from now; `None` applies the default lifetime
    ///
    /// # Returns
    /// Compact JWT string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, TokenError> {
        let claims = Claims::for_subject(subject, ttl.unwrap_or(self.default_ttl));

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its subject.
    ///
    /// # Arguments
    /// * `token` - JWT token string
    ///
    /// # Returns
    /// The subject the token was issued for
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature or algorithm does not match the secret
    /// * `MalformedToken` - Token cannot be decoded or lacks `sub`/`exp`
    /// * `Expired` - Current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.decode(token)?;

        let (Some(subject), Some(_)) = (claims.sub.as_ref(), claims.exp) else {
            return Err(TokenError::MalformedToken);
        };

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(subject.clone())
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the strict `now < exp` rule in `verify`
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::MalformedToken,
            })
    }
}
