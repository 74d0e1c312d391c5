use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use caseworks_core::{DomainError, TenantId};
use caseworks_tenancy::TenantContext;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invariant_violation", msg)
        }
    }
}

/// The request's tenant, or a 500 response.
///
/// Resolution runs before every handler, so an empty slot here means the
/// pipeline is mis-wired; the request must fail rather than touch an
/// unscoped dataset.
pub fn require_tenant(ctx: &TenantContext) -> Result<TenantId, axum::response::Response> {
    ctx.require_current().map_err(|e| {
        tracing::error!("tenant slot empty inside a handler");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "tenant_not_resolved", e.to_string())
    })
}
