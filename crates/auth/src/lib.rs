//! `caseworks-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines
//! the bearer token codec, the claims model, the per-request principal
//! snapshot, and the lookup seam to whatever user store is wired in.

pub mod claims;
pub mod codec;
pub mod error;
pub mod password;
pub mod principal;
pub mod roles;
pub mod store;

pub use claims::Claims;
pub use codec::TokenCodec;
pub use error::{AuthError, TokenError};
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use roles::Role;
pub use store::{InMemoryUserStore, PrincipalStore, StoreError, UserId, UserRecord};
