use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    routing::get,
    Router,
};

use crate::authz::{self, Access};

pub mod auth;
pub mod cases;
pub mod system;
pub mod tenants;
pub mod users;

fn gated(router: Router, access: Access) -> Router {
    router.route_layer(from_fn(move |req: Request, next: Next| {
        authz::gate(access, req, next)
    }))
}

/// Router for everything behind the security pipeline.
///
/// `/health` lives outside in `app::build_app` so probes skip the pipeline
/// entirely.
pub fn router() -> Router {
    let whoami = gated(
        Router::new().route("/whoami", get(system::whoami)),
        Access::Authenticated,
    );

    Router::new()
        .merge(whoami)
        .nest("/auth", auth::router())
        .nest("/cases", cases::router())
        .nest("/users", users::router())
        .nest("/tenants", tenants::router())
}
