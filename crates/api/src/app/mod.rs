//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: shared stores and the token codec
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//!
//! The security pipeline is layered outermost-first: tenant resolution, then
//! authentication, then the per-route authorization gates declared in
//! `routes/`.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use caseworks_auth::{hash_password, InMemoryUserStore, Role, TokenCodec, UserRecord};
use caseworks_tenancy::TenantRegistry;

use crate::config::AppConfig;
use crate::middleware::{self, AuthState, TenantState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AppServices, InMemoryCaseStore};

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: AppConfig) -> Router {
    let registry = Arc::new(TenantRegistry::new());
    let users = Arc::new(InMemoryUserStore::new());
    let cases = Arc::new(InMemoryCaseStore::new());
    let codec = Arc::new(TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.token_ttl,
    ));

    registry.get_or_register(&config.tenancy.default_tenant);
    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(&users, &config, admin);
    }

    let services = Arc::new(AppServices {
        registry: registry.clone(),
        users: users.clone(),
        cases,
        codec: codec.clone(),
    });

    let tenant_state = TenantState {
        config: Arc::new(config.tenancy.clone()),
        registry,
    };
    let auth_state = AuthState {
        codec,
        principals: users,
    };

    // ServiceBuilder applies top-down: tenant resolution is outermost and
    // must run before authentication, which needs the resolved tenant.
    let api = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                tenant_state,
                middleware::tenant_resolution,
            ))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::authenticate,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
}

fn seed_admin(users: &InMemoryUserStore, config: &AppConfig, admin: &crate::config::BootstrapAdmin) {
    let hash = match hash_password(&admin.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "failed to hash bootstrap admin password");
            return;
        }
    };

    let record = UserRecord::new(
        config.tenancy.default_tenant.clone(),
        admin.username.clone(),
        format!("{}@local", admin.username),
        hash,
        vec![Role::new("ADMIN"), Role::new("USER")],
    );

    match users.create(record) {
        Ok(user) => tracing::info!(username = %user.username, "seeded bootstrap admin"),
        Err(e) => tracing::warn!(error = %e, "bootstrap admin not seeded"),
    }
}
