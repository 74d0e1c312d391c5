use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, Request},
    http::StatusCode,
    middleware::{from_fn, Next},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use caseworks_cases::{Case, CaseId, CasePriority, CaseStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, Access};

pub fn router() -> Router {
    // Aggregate numbers across the whole tenant, so admin-only.
    let stats = Router::new()
        .route("/stats", get(stats))
        .route_layer(from_fn(|req: Request, next: Next| {
            authz::gate(Access::Role("ADMIN"), req, next)
        }));

    Router::new()
        .route("/", post(create_case).get(list_cases))
        .route("/number/:case_number", get(get_case_by_number))
        .route("/:id", get(get_case).patch(update_case).delete(delete_case))
        .route_layer(from_fn(|req: Request, next: Next| {
            authz::gate(Access::Authenticated, req, next)
        }))
        .merge(stats)
}

pub async fn create_case(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Json(body): Json<dto::CreateCaseRequest>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let case = match Case::new(tenant_id, body.case_number, body.title, body.description, body.priority) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.cases.insert(case) {
        Ok(created) => (StatusCode::CREATED, Json(dto::case_to_json(&created))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_cases(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Query(query): Query<dto::CaseListQuery>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let status: Option<CaseStatus> = match query.status.as_deref().map(str::parse).transpose() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let priority: Option<CasePriority> = match query.priority.as_deref().map(str::parse).transpose()
    {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let items = services
        .cases
        .list(&tenant_id)
        .iter()
        .filter(|c| status.is_none_or(|s| c.status == s))
        .filter(|c| priority.is_none_or(|p| c.priority == p))
        .filter(|c| {
            query
                .assigned_to
                .as_deref()
                .is_none_or(|a| c.assigned_to.as_deref() == Some(a))
        })
        .map(dto::case_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_case_by_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(case_number): Path<String>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.cases.find_by_number(&tenant_id, &case_number) {
        Some(case) => Json(dto::case_to_json(&case)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "case not found"),
    }
}

pub async fn get_case(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let case_id: CaseId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    match services.cases.get(&tenant_id, &case_id) {
        Some(case) => Json(dto::case_to_json(&case)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "case not found"),
    }
}

pub async fn update_case(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCaseRequest>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let case_id: CaseId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    match services.cases.update(&tenant_id, &case_id, body.into()) {
        Ok(case) => Json(dto::case_to_json(&case)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_case(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let case_id: CaseId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid case id"),
    };

    match services.cases.remove(&tenant_id, &case_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    Json(services.cases.stats(&tenant_id)).into_response()
}
