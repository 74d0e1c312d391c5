use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::{from_fn, Next},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{self, Access};

pub fn router() -> Router {
    Router::new()
        .route("/current", get(current_tenant))
        .route_layer(from_fn(|req: Request, next: Next| {
            authz::gate(Access::Authenticated, req, next)
        }))
}

/// Metadata of the tenant this request resolved to.
pub async fn current_tenant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let info = services.registry.get_or_register(&tenant_id);
    (StatusCode::OK, Json(dto::tenant_to_json(&info))).into_response()
}
