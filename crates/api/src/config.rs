//! Process configuration, read from the environment.

use chrono::Duration;

use caseworks_auth::TokenCodec;
use caseworks_core::TenantId;
use caseworks_tenancy::TenancyConfig;

/// Credentials for the admin account seeded into the default tenant at boot.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub tenancy: TenancyConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: "dev-secret".to_string(),
            token_ttl: TokenCodec::default_ttl(),
            tenancy: TenancyConfig::default(),
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        match std::env::var("JWT_SECRET") {
            Ok(secret) => config.jwt_secret = secret,
            Err(_) => tracing::warn!("JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(hours) = std::env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
        {
            config.token_ttl = Duration::hours(hours);
        }

        if let Ok(header) = std::env::var("TENANT_HEADER") {
            config.tenancy.header_name = header;
        }

        if let Some(tenant) = std::env::var("DEFAULT_TENANT")
            .ok()
            .and_then(|v| TenantId::new(v).ok())
        {
            config.tenancy.default_tenant = tenant;
        }

        if let (Ok(username), Ok(password)) =
            (std::env::var("ADMIN_USERNAME"), std::env::var("ADMIN_PASSWORD"))
        {
            config.bootstrap_admin = Some(BootstrapAdmin { username, password });
        }

        config
    }
}
