use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access token claims.
///
/// Fields are optional on the decoding side so that a token missing a claim
/// is reported as malformed instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user email)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for a subject expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `subject` - Identity the token is issued for
    /// * `ttl` - Lifetime; zero or negative yields an already expired token
    ///
    /// # Returns
    /// Claims with sub, exp and iat set
    pub fn for_subject(subject: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: Some(subject.to_string()),
            exp: Some(expiration.timestamp()),
            iat: Some(now.timestamp()),
        }
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Check if the token is expired.
    ///
    /// A token is only valid strictly before its expiration instant. Claims
    /// without `exp` are never considered expired here; the verifier rejects
    /// them separately.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| current_timestamp >= exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = Claims::new().with_subject("a@b.com");
        assert_eq!(claims.sub, Some("a@b.com".to_string()));
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_for_subject() {
        let claims = Claims::for_subject("a@b.com", Duration::minutes(30));

        assert_eq!(claims.sub, Some("a@b.com".to_string()));

        let exp = claims.exp.unwrap();
        let iat = claims.iat.unwrap();
        assert_eq!(exp - iat, 30 * 60);
    }

    #[test]
    fn test_builder_pattern() {
        let claims = Claims::new()
            .with_subject("a@b.com")
            .with_expiration(1234567890)
            .with_issued_at(1234567800);

        assert_eq!(claims.sub, Some("a@b.com".to_string()));
        assert_eq!(claims.exp, Some(1234567890));
        assert_eq!(claims.iat, Some(1234567800));
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::new().with_expiration(1000);

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_is_expired_no_exp_claim() {
        let claims = Claims::new();
        assert!(!claims.is_expired(9999999999));
    }

    #[test]
    fn test_absent_claims_not_serialized() {
        let claims = Claims::new().with_subject("a@b.com");
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json, serde_json::json!({ "sub": "a@b.com" }));
    }
}
