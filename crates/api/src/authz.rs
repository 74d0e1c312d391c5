//! Authorization gate: the single decision point between identity and routes.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use thiserror::Error;

use caseworks_auth::Principal;

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Access requirement attached to a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone may call, authenticated or not.
    Public,
    /// Any authenticated principal may call.
    Authenticated,
    /// Only principals holding the named role may call.
    ///
    /// Role names match literally and case-sensitively; there is no
    /// hierarchy, so an ADMIN-only route does not admit USER and vice versa.
    Role(&'static str),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("insufficient role")]
    InsufficientRole,
}

/// Pure access decision, separated from the middleware plumbing.
pub fn check(access: Access, principal: Option<&Principal>) -> Result<(), GateError> {
    match access {
        Access::Public => Ok(()),
        Access::Authenticated => match principal {
            Some(_) => Ok(()),
            None => Err(GateError::AuthenticationRequired),
        },
        Access::Role(role) => match principal {
            None => Err(GateError::AuthenticationRequired),
            Some(p) if p.has_role(role) => Ok(()),
            Some(_) => Err(GateError::InsufficientRole),
        },
    }
}

/// Route-level gate middleware. Rejects before the handler runs, so a
/// denied request has no side effects.
pub async fn gate(access: Access, req: Request, next: Next) -> Response {
    let principal = req.extensions().get::<PrincipalContext>().cloned();

    match check(access, principal.as_ref().map(|ctx| ctx.principal())) {
        Ok(()) => next.run(req).await,
        Err(GateError::AuthenticationRequired) => json_error(
            StatusCode::UNAUTHORIZED,
            "authentication_required",
            "authentication required",
        ),
        Err(GateError::InsufficientRole) => json_error(
            StatusCode::FORBIDDEN,
            "insufficient_role",
            "insufficient role",
        ),
    }
}
