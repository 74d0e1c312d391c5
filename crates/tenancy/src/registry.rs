//! Process-wide cache of tenant metadata, populated lazily.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use caseworks_core::TenantId;

/// Display metadata for a tenant.
///
/// Created on first observation of a tenant id, never deleted by this
/// subsystem, mutated only to flip `active`. This cache supplies display
/// metadata only; it never gates authorization, and losing it on restart is
/// acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub tenant_id: TenantId,
    pub display_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantInfo {
    /// Default record synthesized on first observation of a tenant id.
    fn synthesized(tenant_id: &TenantId) -> Self {
        let now = Utc::now();
        Self {
            tenant_id: tenant_id.clone(),
            display_name: format!("Tenant {tenant_id}"),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Process-wide tenant id → metadata cache.
///
/// Concurrent reads and inserts are safe; entries are immutable once written
/// except for `active`, a single-field idempotent update, so no cross-key
/// locking is needed.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    tenants: DashMap<TenantId, TenantInfo>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached metadata, synthesizing a default record on miss.
    ///
    /// The insert is per-key atomic: concurrent first observations of the
    /// same tenant produce exactly one record.
    pub fn get_or_register(&self, tenant_id: &TenantId) -> TenantInfo {
        self.tenants
            .entry(tenant_id.clone())
            .or_insert_with(|| {
                tracing::debug!(tenant_id = %tenant_id, "registering tenant");
                TenantInfo::synthesized(tenant_id)
            })
            .clone()
    }

    pub fn get(&self, tenant_id: &TenantId) -> Option<TenantInfo> {
        self.tenants.get(tenant_id).map(|info| info.clone())
    }

    /// Flip the `active` flag. Returns the updated record if the tenant is known.
    pub fn set_active(&self, tenant_id: &TenantId, active: bool) -> Option<TenantInfo> {
        self.tenants.get_mut(tenant_id).map(|mut info| {
            info.active = active;
            info.updated_at = Utc::now();
            info.clone()
        })
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
