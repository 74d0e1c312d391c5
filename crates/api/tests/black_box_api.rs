//! Black-box HTTP tests: spawn the real router on an ephemeral port and talk
//! to it with a plain HTTP client, exactly like an external caller would.

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use caseworks_api::config::{AppConfig, BootstrapAdmin};
use caseworks_auth::{Role, TokenCodec};
use caseworks_core::TenantId;

const JWT_SECRET: &str = "black-box-secret";
const ADMIN_USERNAME: &str = "root";
const ADMIN_PASSWORD: &str = "root-password-123";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig {
            jwt_secret: JWT_SECRET.to_string(),
            bootstrap_admin: Some(BootstrapAdmin {
                username: ADMIN_USERNAME.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            }),
            ..AppConfig::default()
        };

        let app = caseworks_api::app::build_app(config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Register a user in `tenant` and log them in; returns the bearer token.
async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    tenant: &str,
    username: &str,
) -> String {
    let res = client
        .post(format!("{base_url}/auth/register"))
        .header("X-TenantID", tenant)
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse battery staple",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    login(client, base_url, tenant, username, "correct horse battery staple").await
}

async fn login(
    client: &reqwest::Client,
    base_url: &str,
    tenant: &str,
    username: &str,
    password: &str,
) -> String {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .header("X-TenantID", tenant)
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_round_trip_and_whoami() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &server.base_url, "acme", "alice").await;

    let res = client
        .get(format!("{}/whoami", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"], "acme");
    assert_eq!(body["subject"], "alice");
    assert_eq!(body["roles"], json!(["USER"]));
}

#[tokio::test]
async fn login_rejection_does_not_say_which_credential_failed() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_and_login(&client, &server.base_url, "acme", "alice").await;

    // Unknown user and wrong password must be indistinguishable.
    let mut bodies = Vec::new();
    for (username, password) in [("nobody", "whatever"), ("alice", "wrong password")] {
        let res = client
            .post(format!("{}/auth/login", server.base_url))
            .header("X-TenantID", "acme")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        bodies.push(res.json::<serde_json::Value>().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn missing_token_on_protected_route_is_401() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "authentication_required");
}

#[tokio::test]
async fn expired_token_is_unauthorized_not_server_error() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_and_login(&client, &server.base_url, "acme", "alice").await;

    // Mint a token that expired an hour ago, with the server's real secret.
    let codec = TokenCodec::new(JWT_SECRET.as_bytes(), ChronoDuration::hours(1));
    let tenant = TenantId::new("acme").unwrap();
    let expired = codec
        .issue_at(
            "alice",
            &[Role::new("USER")],
            &tenant,
            Utc::now() - ChronoDuration::hours(2),
        )
        .unwrap();

    let res = client
        .get(format!("{}/whoami", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", server.base_url))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_role_cannot_reach_admin_routes() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &server.base_url, "default", "bob").await;

    let res = client
        .get(format!("{}/users", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_role");
}

#[tokio::test]
async fn denied_role_leaves_no_side_effects() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let user_token = register_and_login(&client, &server.base_url, "default", "mallory").await;
    let admin_token = login(
        &client,
        &server.base_url,
        "default",
        ADMIN_USERNAME,
        ADMIN_PASSWORD,
    )
    .await;

    // A USER token tries an admin-only mutation: create an account.
    let res = client
        .post(format!("{}/users", server.base_url))
        .bearer_auth(&user_token)
        .json(&json!({
            "username": "intruder",
            "email": "intruder@example.com",
            "password": "whatever",
            "roles": ["ADMIN"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The gate must have rejected before the handler ran: nothing created.
    let res = client
        .get(format!("{}/users", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|u| u["username"] != "intruder"));

    // Same for an admin-only mutation of an existing record.
    let admin_id = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == ADMIN_USERNAME)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .patch(format!("{}/users/{}/active", server.base_url, admin_id))
        .bearer_auth(&user_token)
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Admin account untouched; its token still works.
    let res = client
        .get(format!("{}/users", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_admin_can_manage_users() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let user_token = register_and_login(&client, &server.base_url, "default", "carol").await;
    let admin_token = login(
        &client,
        &server.base_url,
        "default",
        ADMIN_USERNAME,
        ADMIN_PASSWORD,
    )
    .await;

    let res = client
        .get(format!("{}/users", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    let carol = items
        .iter()
        .find(|u| u["username"] == "carol")
        .expect("carol listed");
    let carol_id = carol["id"].as_str().unwrap();

    // Deactivate carol; her still-valid token must stop working immediately.
    let res = client
        .patch(format!("{}/users/{}/active", server.base_url, carol_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/whoami", server.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn case_lifecycle_create_update_resolve_delete() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &server.base_url, "acme", "dave").await;

    let res = client
        .post(format!("{}/cases", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .json(&json!({
            "title": "Printer on fire",
            "description": "Third floor, again.",
            "priority": "HIGH",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["status"], "OPEN");
    assert_eq!(created["priority"], "HIGH");
    assert!(created["case_number"].as_str().unwrap().starts_with("CASE-"));
    let id = created["id"].as_str().unwrap();

    let res = client
        .patch(format!("{}/cases/{}", server.base_url, id))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .json(&json!({ "status": "RESOLVED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let resolved: serde_json::Value = res.json().await.unwrap();
    assert_eq!(resolved["status"], "RESOLVED");
    assert!(!resolved["resolved_date"].is_null());

    let res = client
        .delete(format!("{}/cases/{}", server.base_url, id))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/cases/{}", server.base_url, id))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cases_are_invisible_across_tenants() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let acme_token = register_and_login(&client, &server.base_url, "acme", "erin").await;
    let globex_token = register_and_login(&client, &server.base_url, "globex", "erin").await;

    let res = client
        .post(format!("{}/cases", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&acme_token)
        .json(&json!({ "title": "Acme-only incident" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    // Same record id, other tenant: not found, not forbidden.
    let res = client
        .get(format!("{}/cases/{}", server.base_url, id))
        .header("X-TenantID", "globex")
        .bearer_auth(&globex_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/cases", server.base_url))
        .header("X-TenantID", "globex")
        .bearer_auth(&globex_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn token_is_bound_to_its_tenant() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // alice exists only in acme; her token must not work under another tenant.
    let token = register_and_login(&client, &server.base_url, "acme", "alice").await;

    let res = client
        .get(format!("{}/whoami", server.base_url))
        .header("X-TenantID", "globex")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sequential_requests_do_not_leak_tenant_state() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let acme_token = register_and_login(&client, &server.base_url, "acme", "frank").await;
    let default_token = register_and_login(&client, &server.base_url, "default", "grace").await;

    // Request A carries an explicit tenant header.
    let res = client
        .get(format!("{}/whoami", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&acme_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"], "acme");

    // Request B omits the header and must see the default tenant, never A's.
    let res = client
        .get(format!("{}/whoami", server.base_url))
        .bearer_auth(&default_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"], "default");
}

#[tokio::test]
async fn stats_are_admin_only_and_tenant_scoped() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let user_token = register_and_login(&client, &server.base_url, "default", "heidi").await;
    let admin_token = login(
        &client,
        &server.base_url,
        "default",
        ADMIN_USERNAME,
        ADMIN_PASSWORD,
    )
    .await;

    let res = client
        .post(format!("{}/cases", server.base_url))
        .bearer_auth(&user_token)
        .json(&json!({ "title": "Default-tenant case" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/cases/stats", server.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/cases/stats", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["open"], 1);
}

#[tokio::test]
async fn cases_list_filters_and_lookup_by_number() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &server.base_url, "acme", "kim").await;

    for (number, title, priority) in [
        ("INC-1", "Disk almost full", "HIGH"),
        ("INC-2", "Password reset", "LOW"),
    ] {
        let res = client
            .post(format!("{}/cases", server.base_url))
            .header("X-TenantID", "acme")
            .bearer_auth(&token)
            .json(&json!({ "case_number": number, "title": title, "priority": priority }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/cases?priority=HIGH", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["case_number"], "INC-1");

    // Unknown filter value is a client error, not an empty result.
    let res = client
        .get(format!("{}/cases?status=BOGUS", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/cases/number/INC-2", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["title"], "Password reset");
}

#[tokio::test]
async fn admin_can_elevate_a_user_to_admin() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let user_token = register_and_login(&client, &server.base_url, "default", "lena").await;
    let admin_token = login(
        &client,
        &server.base_url,
        "default",
        ADMIN_USERNAME,
        ADMIN_PASSWORD,
    )
    .await;

    let res = client
        .get(format!("{}/cases/stats", server.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/users", server.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let lena_id = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "lena")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .patch(format!("{}/users/{}", server.base_url, lena_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "roles": ["ADMIN", "USER"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Roles are read from the store per request, so the old token now
    // carries admin access without being reissued.
    let res = client
        .get(format!("{}/cases/stats", server.base_url))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_and_logout() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &server.base_url, "acme", "ivan").await;

    let res = client
        .get(format!("{}/auth/me", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "ivan");
    assert!(body.get("password_hash").is_none());

    let res = client
        .post(format!("{}/auth/logout", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Stateless tokens: logout does not revoke, the token still verifies.
    let res = client
        .get(format!("{}/whoami", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_registry_exposes_current_tenant() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &server.base_url, "acme", "judy").await;

    let res = client
        .get(format!("{}/tenants/current", server.base_url))
        .header("X-TenantID", "acme")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"], "acme");
    assert_eq!(body["display_name"], "Tenant acme");
    assert_eq!(body["active"], true);
}
