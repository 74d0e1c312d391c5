use thiserror::Error;

use crate::store::StoreError;

/// Token verification failure.
///
/// Classified for observability only; clients see a generic
/// authentication-failed response, never the concrete variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not have exactly three non-empty segments, or the header
    /// or claims failed to decode.
    #[error("malformed token")]
    Malformed,

    /// Recomputed signature did not match.
    #[error("invalid token signature")]
    InvalidSignature,

    /// `exp` lies in the past (strict comparison, no leeway).
    #[error("token expired")]
    Expired,
}

/// Authentication failure for a present-but-unusable bearer token.
///
/// All variants are treated identically at the HTTP boundary: the request
/// proceeds unauthenticated and the authorization gate decides the outcome.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Claims reference a user absent from the tenant's population.
    #[error("principal not found")]
    PrincipalNotFound,

    /// The stored account is deactivated even though the token is valid.
    #[error("principal inactive")]
    PrincipalInactive,

    #[error(transparent)]
    Store(#[from] StoreError),
}
