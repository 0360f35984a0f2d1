use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Literal prefix that marks a value as an already-hashed credential record.
pub const HASH_MARKER: &str = "__hash__";

/// Default PBKDF2 work factor.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

const SALT_BYTES: usize = 32;
const KEY_BYTES: usize = 64;

/// Marker plus hex-encoded salt. The whole segment is fed to the KDF as salt.
const SALT_SEGMENT_LENGTH: usize = HASH_MARKER.len() + SALT_BYTES * 2;

/// Total length of a credential record.
pub const HASHED_LENGTH: usize = SALT_SEGMENT_LENGTH + KEY_BYTES * 2;

/// Password hashing implementation.
///
/// Produces self-describing credential records of the form
/// `__hash__<64 hex salt><128 hex PBKDF2-HMAC-SHA512 key>`, 200 characters in total.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher using `DEFAULT_ITERATIONS`
    pub fn new() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Override the PBKDF2 iteration count.
    ///
    /// Records are only verifiable by a hasher configured with the same count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Credential record (marker, salt and derived key)
    ///
    /// # Errors
    /// * `SecureRandomUnavailable` - The operating system random source failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PasswordError::SecureRandomUnavailable(e.to_string()))?;

        let mut record = String::with_capacity(HASHED_LENGTH);
        record.push_str(HASH_MARKER);
        record.push_str(&hex::encode(salt));
        let key = self.derive(password, &record);
        record.push_str(&key);

        Ok(record)
    }

    /// Check whether a value already is a credential record.
    pub fn is_hashed(value: &str) -> bool {
        value.starts_with(HASH_MARKER) && value.len() == HASHED_LENGTH
    }

    /// Hash `value` unless it already is a credential record.
    ///
    /// Lets a write path accept either a plaintext password or a previously
    /// stored record without hashing twice.
    ///
    /// # Errors
    /// * `SecureRandomUnavailable` - The operating system random source failed
    pub fn hash_if_needed(&self, value: &str) -> Result<String, PasswordError> {
        if Self::is_hashed(value) {
            Ok(value.to_string())
        } else {
            self.hash(value)
        }
    }

    /// Verify a candidate password against a stored credential record.
    ///
    /// # Arguments
    /// * `stored` - Credential record produced by `hash`
    /// * `candidate` - Plaintext password to verify
    ///
    /// # Returns
    /// True if the password matches. Malformed records never match.
    pub fn verify(&self, stored: &str, candidate: &str) -> bool {
        let (Some(salt), Some(expected)) = (
            stored.get(..SALT_SEGMENT_LENGTH),
            stored.get(SALT_SEGMENT_LENGTH..),
        ) else {
            return false;
        };

        let derived = self.derive(candidate, salt);
        derived.as_bytes().ct_eq(expected.as_bytes()).into()
    }

    fn derive(&self, password: &str, salt: &str) -> String {
        let mut key = [0u8; KEY_BYTES];
        pbkdf2_hmac::<Sha512>(
            password.as_bytes(),
            salt.as_bytes(),
            self.iterations,
            &mut key,
        );
        hex::encode(key)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Produced by the previous deployment for "secret123" at 100k iterations.
    const STORED_RECORD: &str = "__hash__0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f355b001169540cba7bce700e98f46f8873f41494a5fa42cef355d40f91a82206608693b657180dc0f93f7887a371f90a29a60aba394daf9d275484d5b2f26551";

    fn hasher() -> PasswordHasher {
        PasswordHasher::new().with_iterations(1_000)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(&hash, password));
        assert!(!hasher.verify(&hash, "wrong_password"));
    }

    #[test]
    fn test_hash_layout() {
        let hash = hasher().hash("secret123").expect("Failed to hash password");

        assert_eq!(hash.len(), HASHED_LENGTH);
        assert_eq!(HASHED_LENGTH, 200);
        assert!(hash.starts_with(HASH_MARKER));
        assert!(hash[HASH_MARKER.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(PasswordHasher::is_hashed(&hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();

        let first = hasher.hash("secret123").expect("Failed to hash password");
        let second = hasher.hash("secret123").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "secret123"));
        assert!(hasher.verify(&second, "secret123"));
    }

    #[test]
    fn test_hash_if_needed_is_idempotent() {
        let hasher = hasher();

        let stored = hasher
            .hash_if_needed("secret123")
            .expect("Failed to hash password");
        assert!(PasswordHasher::is_hashed(&stored));

        let resaved = hasher
            .hash_if_needed(&stored)
            .expect("Failed to hash password");
        assert_eq!(resaved, stored);
    }

    #[test]
    fn test_is_hashed_rejects_plaintext() {
        assert!(!PasswordHasher::is_hashed("secret123"));
        assert!(!PasswordHasher::is_hashed(""));
        assert!(!PasswordHasher::is_hashed(HASH_MARKER));
        assert!(!PasswordHasher::is_hashed(&"a".repeat(HASHED_LENGTH)));
        assert!(!PasswordHasher::is_hashed(&STORED_RECORD[..HASHED_LENGTH - 1]));
    }

    #[test]
    fn test_verify_malformed_record() {
        let hasher = hasher();

        assert!(!hasher.verify("", "password"));
        assert!(!hasher.verify("invalid_hash", "password"));
        assert!(!hasher.verify(HASH_MARKER, ""));
        // Multi-byte character straddling the salt boundary
        let straddling = format!("{}é", "a".repeat(SALT_SEGMENT_LENGTH - 1));
        assert!(!hasher.verify(&straddling, "password"));
    }

    #[test]
    fn test_verify_record_without_key_segment() {
        let hasher = hasher();
        let hash = hasher.hash("secret123").expect("Failed to hash password");

        assert!(!hasher.verify(&hash[..SALT_SEGMENT_LENGTH], "secret123"));
    }

    #[test]
    fn test_verify_requires_same_iterations() {
        let hash = hasher().hash("secret123").expect("Failed to hash password");

        let other = PasswordHasher::new().with_iterations(2_000);
        assert!(!other.verify(&hash, "secret123"));
    }

    #[test]
    fn test_verify_existing_record() {
        let hasher = PasswordHasher::new();

        assert!(PasswordHasher::is_hashed(STORED_RECORD));
        assert!(hasher.verify(STORED_RECORD, "secret123"));
        assert!(!hasher.verify(STORED_RECORD, "secret124"));
    }
}
