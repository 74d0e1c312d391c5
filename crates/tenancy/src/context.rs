//! Request-scoped tenant slot with guaranteed teardown.
//!
//! A [`TenantContext`] is created fresh for every request and travels with
//! that request only; workers reused from the pool never observe another
//! request's slot. The slot is populated through [`TenantContext::enter`],
//! which returns a [`TenantScope`] guard whose `Drop` clears the slot on
//! every exit path: normal completion, handler error, panic, and
//! cancellation (the request future being dropped).

use std::sync::{Arc, RwLock};

use thiserror::Error;

use caseworks_core::TenantId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TenancyError {
    /// Tenant-aware code ran outside an active resolution scope.
    ///
    /// This is an integration error, never a user error: resolution is
    /// infallible and runs before anything tenant-aware. Callers must fail
    /// the operation rather than fall back to an unscoped dataset.
    #[error("tenant not resolved for this request")]
    TenantNotResolved,
}

/// Request-scoped holder of the current tenant id.
///
/// Cheap to clone; clones share the same slot so middleware, extensions, and
/// handlers all observe one value and one teardown.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    slot: Arc<RwLock<Option<TenantId>>>,
}

impl TenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the tenant id and return the guard that clears it.
    pub fn enter(&self, tenant_id: TenantId) -> TenantScope {
        self.set_current(tenant_id);
        TenantScope { ctx: self.clone() }
    }

    pub fn set_current(&self, tenant_id: TenantId) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(tenant_id);
        }
    }

    pub fn current(&self) -> Option<TenantId> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }

    /// The tenant id, or `TenantNotResolved` outside an active scope.
    ///
    /// Every tenant-aware data access goes through this; an unresolved
    /// tenant must abort the operation, not silently default.
    pub fn require_current(&self) -> Result<TenantId, TenancyError> {
        self.current().ok_or(TenancyError::TenantNotResolved)
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
    }
}

/// Scope guard for the tenant slot. Clears exactly once, on drop.
#[must_use = "dropping the scope immediately would clear the tenant slot"]
pub struct TenantScope {
    ctx: TenantContext,
}

impl Drop for TenantScope {
    fn drop(&mut self) {
        self.ctx.clear();
    }
}
