use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caseworks_core::TenantId;

use crate::Role;

/// Token payload claims.
///
/// This is the full set of fields carried inside a bearer token. Tokens are
/// integrity-protected but **not encrypted**, so nothing confidential beyond
/// subject/roles/tenant belongs here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username of the principal.
    pub sub: String,

    /// RBAC roles granted within the tenant.
    pub roles: Vec<Role>,

    /// Tenant the token was issued for.
    pub tenant_id: TenantId,

    /// Issued-at, epoch seconds.
    pub iat: i64,

    /// Expires-at, epoch seconds.
    pub exp: i64,
}

impl Claims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
