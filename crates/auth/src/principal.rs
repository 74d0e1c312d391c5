use caseworks_core::TenantId;

use crate::{Claims, Role, store::UserRecord};

/// The authenticated identity and role set for one request.
///
/// Constructed once per request from validated token claims plus the stored
/// account, then never mutated. It is owned by the request that created it
/// and discarded at request end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    roles: Vec<Role>,
    tenant_id: TenantId,
    active: bool,
}

impl Principal {
    /// Snapshot a principal from verified claims and the stored account.
    ///
    /// Roles come from the store, not the token: a role revoked after token
    /// issuance takes effect on the next request.
    pub fn from_record(claims: &Claims, record: &UserRecord) -> Self {
        Self {
            subject: claims.sub.clone(),
            roles: record.roles.clone(),
            tenant_id: claims.tenant_id.clone(),
            active: record.active,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Exact, case-sensitive role membership. No hierarchy.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }
}
