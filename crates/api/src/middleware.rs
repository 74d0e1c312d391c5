//! Tenant resolution and authentication stages.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use caseworks_auth::{AuthError, Principal, PrincipalStore, TokenCodec};
use caseworks_core::{TenantId, TraceId};
use caseworks_tenancy::{TenancyConfig, TenantContext, TenantRegistry};

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct TenantState {
    pub config: Arc<TenancyConfig>,
    pub registry: Arc<TenantRegistry>,
}

/// Tenant resolution stage. Runs first; infallible by construction.
///
/// Resolves the tenant id from the configured header (default when missing
/// or blank), registers metadata lazily, and publishes a fresh per-request
/// [`TenantContext`] plus a [`TraceId`] into request extensions. The scope
/// guard clears the tenant slot on every exit path, including cancellation.
pub async fn tenant_resolution(
    State(state): State<TenantState>,
    mut req: Request,
    next: Next,
) -> Response {
    let trace_id = TraceId::new();
    let tenant_id = resolve_tenant_id(&state.config, req.headers());

    state.registry.get_or_register(&tenant_id);

    let ctx = TenantContext::new();
    req.extensions_mut().insert(trace_id);
    req.extensions_mut().insert(ctx.clone());

    tracing::debug!(trace_id = %trace_id, tenant_id = %tenant_id, "tenant resolved");

    let _scope = ctx.enter(tenant_id);
    next.run(req).await
}

fn resolve_tenant_id(config: &TenancyConfig, headers: &HeaderMap) -> TenantId {
    headers
        .get(&config.header_name)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| TenantId::new(raw).ok())
        .unwrap_or_else(|| config.default_tenant.clone())
}

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub principals: Arc<dyn PrincipalStore>,
}

/// Authentication stage. Runs after tenant resolution; never rejects.
///
/// An absent bearer token leaves the request unauthenticated (many routes
/// are public). A present-but-invalid token does too: the classified reason
/// is logged with the trace id, never sent to the client, and the
/// authorization gate decides the user-visible outcome.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return next.run(req).await;
    };
    let token = token.to_string();

    let trace_id = req.extensions().get::<TraceId>().copied().unwrap_or_default();
    let Some(tenant_id) = req
        .extensions()
        .get::<TenantContext>()
        .and_then(|ctx| ctx.current())
    else {
        // Pipeline ordering bug: authentication must follow tenant resolution.
        tracing::error!(trace_id = %trace_id, "authentication ran without a resolved tenant");
        return next.run(req).await;
    };

    match establish_principal(&state, &tenant_id, &token).await {
        Ok(principal) => {
            req.extensions_mut().insert(PrincipalContext::new(principal));
        }
        Err(reason) => {
            tracing::warn!(
                trace_id = %trace_id,
                tenant_id = %tenant_id,
                reason = %reason,
                "authentication failed; request proceeds unauthenticated"
            );
        }
    }

    next.run(req).await
}

async fn establish_principal(
    state: &AuthState,
    tenant_id: &TenantId,
    token: &str,
) -> Result<Principal, AuthError> {
    let claims = state.codec.verify(token, Utc::now())?;

    // Lookup is scoped to the tenant resolved for *this request*, not the
    // tenant named in the token; a token minted elsewhere simply misses.
    let record = state
        .principals
        .lookup(tenant_id, &claims.sub)
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;

    if !record.active {
        return Err(AuthError::PrincipalInactive);
    }

    Ok(Principal::from_record(&claims, &record))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
