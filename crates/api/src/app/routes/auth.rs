use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::{from_fn, Next},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use caseworks_auth::{hash_password, verify_password, Role, UserRecord};
use caseworks_tenancy::TenantContext;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, Access};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route_layer(from_fn(|req: Request, next: Next| {
            authz::gate(Access::Authenticated, req, next)
        }));

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .merge(protected)
}

/// Exchange username/password for a bearer token, scoped to the request's
/// tenant. The rejection never says which part of the credentials failed.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let rejected =
        || errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials");

    let Some(user) = services.users.find_by_username(&tenant_id, &body.username) else {
        return rejected();
    };
    if !user.active || !verify_password(&body.password, &user.password_hash) {
        return rejected();
    }

    let token = match services.codec.issue(&user.username, &user.roles, &tenant_id) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize token claims");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_issuance_failed",
                "could not issue token",
            );
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "token_type": "Bearer",
            "expires_in": services.codec.ttl().num_seconds(),
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

/// Self-service signup. New accounts always get the USER role; elevation is
/// an admin operation.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if body.username.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password are required",
        );
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hashing_failed",
                "could not process password",
            );
        }
    };

    let mut record = UserRecord::new(
        tenant_id,
        body.username.trim(),
        body.email.trim(),
        password_hash,
        vec![Role::new("USER")],
    );
    if let Some(name) = body.display_name {
        record.display_name = name;
    }

    match services.users.create(record) {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// The authenticated user's own account.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.find_by_username(&tenant_id, principal.subject()) {
        Some(user) => Json(dto::user_to_json(&user)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
    }
}

/// Tokens are stateless; there is nothing to invalidate server-side. The
/// endpoint exists so clients have a uniform logout call.
pub async fn logout() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "logged out" })),
    )
        .into_response()
}
