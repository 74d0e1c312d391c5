use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Echo of the request's resolved tenant and authenticated identity.
pub async fn whoami(
    Extension(tenant): Extension<caseworks_tenancy::TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let tenant_id = match errors::require_tenant(&tenant) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    Json(serde_json::json!({
        "tenant_id": tenant_id.to_string(),
        "subject": principal.subject(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
    }))
    .into_response()
}
