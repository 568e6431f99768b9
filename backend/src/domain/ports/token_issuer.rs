//! Driven port for signed access and refresh tokens.

use crate::domain::{TokenKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// Signature, structure or claims are invalid.
        Invalid { message: String } => "token rejected: {message}",
        /// The token is past its expiry.
        Expired => "token expired",
        /// A token of the other kind was presented.
        WrongKind { expected: String } => "expected a {expected} token",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a token of `kind` for `subject`.
    fn issue(&self, subject: &UserId, kind: TokenKind) -> Result<String, TokenError>;

    /// Verify a token and return its subject if it is of `expected` kind.
    fn verify(&self, token: &str, expected: TokenKind) -> Result<UserId, TokenError>;
}
