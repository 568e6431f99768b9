//! Credential adapters: Argon2id password hashes and HS256 bearer tokens.

mod argon2_hasher;
mod jwt_token_issuer;

pub use argon2_hasher::Argon2PasswordHasher;
pub use jwt_token_issuer::{DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL, JwtTokenIssuer};
