//! Admin-only user management within the request's tenant.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Request},
    http::StatusCode,
    middleware::{from_fn, Next},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use caseworks_auth::{hash_password, Role, UserId, UserRecord};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, Access};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/:id/active", patch(set_active))
        .route_layer(from_fn(|req: Request, next: Next| {
            authz::gate(Access::Role("ADMIN"), req, next)
        }))
}

fn roles_from_names(names: Vec<String>) -> Vec<Role> {
    names.into_iter().map(Role::new).collect()
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let items = services
        .users
        .list(&tenant_id)
        .iter()
        .map(dto::user_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

/// Admin-created account. Unlike self-service registration, explicit roles
/// are honored here.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Json(body): Json<dto::CreateUserRequest>,
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

    let roles = body
        .roles
        .map(roles_from_names)
        .unwrap_or_else(|| vec![Role::new("USER")]);

    let mut record = UserRecord::new(
        tenant_id,
        body.username.trim(),
        body.email.trim(),
        password_hash,
        roles,
    );
    if let Some(name) = body.display_name {
        record.display_name = name;
    }

    match services.users.create(record) {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    let result = services.users.update(&tenant_id, &user_id, |user| {
        if let Some(name) = body.display_name {
            user.display_name = name;
        }
        if let Some(email) = body.email {
            user.email = email;
        }
        if let Some(roles) = body.roles {
            user.roles = roles_from_names(roles);
        }
    });

    match result {
        Ok(user) => Json(dto::user_to_json(&user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.users.get(&tenant_id, &user_id) {
        Some(user) => Json(dto::user_to_json(&user)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
    }
}

/// Activate/deactivate an account. Deactivation takes effect on the user's
/// next request even if their token is still within its lifetime.
pub async fn set_active(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetActiveRequest>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.users.set_active(&tenant_id, &user_id, body.active) {
        Ok(user) => Json(dto::user_to_json(&user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.users.remove(&tenant_id, &user_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
