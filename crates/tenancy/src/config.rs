use caseworks_core::TenantId;

/// Tenant resolution settings.
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Header carrying the tenant id.
    pub header_name: String,

    /// Tenant substituted when the header is missing or blank.
    pub default_tenant: TenantId,
}

impl TenancyConfig {
    pub const DEFAULT_HEADER_NAME: &'static str = "X-TenantID";
    pub const DEFAULT_TENANT: &'static str = "default";
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            header_name: Self::DEFAULT_HEADER_NAME.to_string(),
            default_tenant: TenantId::new(Self::DEFAULT_TENANT)
                .expect("default tenant id is non-empty"),
        }
    }
}
