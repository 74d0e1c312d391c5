//! Service wiring: the shared stores and token codec behind the routes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;

use caseworks_auth::{InMemoryUserStore, TokenCodec};
use caseworks_cases::{Case, CaseId, CaseStatus, UpdateCase};
use caseworks_core::{DomainError, TenantId};
use caseworks_tenancy::TenantRegistry;

pub struct AppServices {
    pub registry: Arc<TenantRegistry>,
    pub users: Arc<InMemoryUserStore>,
    pub cases: Arc<InMemoryCaseStore>,
    pub codec: Arc<TokenCodec>,
}

/// In-memory tenant-isolated case store.
///
/// Keyed by `(tenant, case id)` so no query can cross a tenant boundary by
/// construction; every read and write takes the caller's tenant id.
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    inner: RwLock<HashMap<(TenantId, CaseId), Case>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub resolved: usize,
    pub closed: usize,
    pub cancelled: usize,
    pub overdue: usize,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, case: Case) -> Result<Case, DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("case store lock poisoned"))?;

        let duplicate = map
            .values()
            .any(|c| c.tenant_id == case.tenant_id && c.case_number == case.case_number);
        if duplicate {
            return Err(DomainError::conflict(format!(
                "case number {} already exists",
                case.case_number
            )));
        }

        map.insert((case.tenant_id.clone(), case.id), case.clone());
        Ok(case)
    }

    pub fn get(&self, tenant_id: &TenantId, id: &CaseId) -> Option<Case> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id.clone(), *id)).cloned()
    }

    pub fn find_by_number(&self, tenant_id: &TenantId, case_number: &str) -> Option<Case> {
        let map = self.inner.read().ok()?;
        map.values()
            .find(|c| c.tenant_id == *tenant_id && c.case_number == case_number)
            .cloned()
    }

    /// All cases for one tenant, newest first.
    pub fn list(&self, tenant_id: &TenantId) -> Vec<Case> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut cases: Vec<Case> = map
            .values()
            .filter(|c| c.tenant_id == *tenant_id)
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        cases
    }

    pub fn update(
        &self,
        tenant_id: &TenantId,
        id: &CaseId,
        update: UpdateCase,
    ) -> Result<Case, DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("case store lock poisoned"))?;

        let case = map
            .get_mut(&(tenant_id.clone(), *id))
            .ok_or(DomainError::NotFound)?;
        case.apply_update(update)?;
        Ok(case.clone())
    }

    pub fn remove(&self, tenant_id: &TenantId, id: &CaseId) -> Result<(), DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("case store lock poisoned"))?;
        map.remove(&(tenant_id.clone(), *id))
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }

    pub fn stats(&self, tenant_id: &TenantId) -> CaseStats {
        let now = Utc::now();
        let cases = self.list(tenant_id);

        let count = |status: CaseStatus| cases.iter().filter(|c| c.status == status).count();
        CaseStats {
            total: cases.len(),
            open: count(CaseStatus::Open),
            in_progress: count(CaseStatus::InProgress),
            pending: count(CaseStatus::Pending),
            resolved: count(CaseStatus::Resolved),
            closed: count(CaseStatus::Closed),
            cancelled: count(CaseStatus::Cancelled),
            overdue: cases.iter().filter(|c| c.is_overdue(now)).count(),
        }
    }
}
