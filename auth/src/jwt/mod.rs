pub mod claims;
pub mod errors;
pub mod issuer;

pub use claims::Claims;
pub use errors::TokenError;
pub use issuer::TokenIssuer;
pub use issuer::DEFAULT_TOKEN_TTL_MINUTES;
