pub mod errors;
pub mod pbkdf2;

pub use self::pbkdf2::PasswordHasher;
pub use self::pbkdf2::DEFAULT_ITERATIONS;
pub use self::pbkdf2::HASHED_LENGTH;
pub use self::pbkdf2::HASH_MARKER;
pub use errors::PasswordError;
