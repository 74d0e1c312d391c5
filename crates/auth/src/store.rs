//! Principal lookup seam and the in-memory user store.
//!
//! The pipeline only ever consumes [`PrincipalStore::lookup`]; the richer
//! management surface on [`InMemoryUserStore`] backs the admin routes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use caseworks_core::{DomainError, Entity, TenantId};

use crate::Role;

/// Unique identifier for a user within a tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("UserId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Stored user account (credentials + role set), tenant-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(
        tenant_id: TenantId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        let now = Utc::now();
        let username = username.into();
        Self {
            id: UserId::new(),
            tenant_id,
            display_name: username.clone(),
            username,
            email: email.into(),
            password_hash: password_hash.into(),
            roles,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for UserRecord {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Failure talking to the backing store (not "user absent" — that is `None`).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("principal store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of a user's credentials and role set by username.
///
/// Lookups are always tenant-scoped: the same username in two tenants is two
/// unrelated accounts.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn lookup(
        &self,
        tenant_id: &TenantId,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError>;
}

/// In-memory tenant-isolated user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<(TenantId, UserId), UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, record: UserRecord) -> Result<UserRecord, DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("user store lock poisoned"))?;

        let duplicate = map.values().any(|u| {
            u.tenant_id == record.tenant_id
                && (u.username == record.username || u.email == record.email)
        });
        if duplicate {
            return Err(DomainError::conflict("username or email already exists"));
        }

        map.insert((record.tenant_id.clone(), record.id), record.clone());
        Ok(record)
    }

    pub fn get(&self, tenant_id: &TenantId, id: &UserId) -> Option<UserRecord> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id.clone(), *id)).cloned()
    }

    pub fn find_by_username(&self, tenant_id: &TenantId, username: &str) -> Option<UserRecord> {
        let map = self.inner.read().ok()?;
        map.values()
            .find(|u| u.tenant_id == *tenant_id && u.username == username)
            .cloned()
    }

    pub fn list(&self, tenant_id: &TenantId) -> Vec<UserRecord> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut users: Vec<UserRecord> = map
            .values()
            .filter(|u| u.tenant_id == *tenant_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Apply a mutation to a stored user and stamp `updated_at`.
    pub fn update<F>(
        &self,
        tenant_id: &TenantId,
        id: &UserId,
        mutate: F,
    ) -> Result<UserRecord, DomainError>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("user store lock poisoned"))?;

        let record = map
            .get_mut(&(tenant_id.clone(), *id))
            .ok_or(DomainError::NotFound)?;
        mutate(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    pub fn set_active(
        &self,
        tenant_id: &TenantId,
        id: &UserId,
        active: bool,
    ) -> Result<UserRecord, DomainError> {
        self.update(tenant_id, id, |u| u.active = active)
    }

    pub fn remove(&self, tenant_id: &TenantId, id: &UserId) -> Result<(), DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("user store lock poisoned"))?;
        map.remove(&(tenant_id.clone(), *id))
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }
}

#[async_trait]
impl PrincipalStore for InMemoryUserStore {
    async fn lookup(
        &self,
        tenant_id: &TenantId,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.find_by_username(tenant_id, username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(name: &str) -> TenantId {
        TenantId::new(name).unwrap()
    }

    fn record(tenant_id: TenantId, username: &str) -> UserRecord {
        UserRecord::new(
            tenant_id,
            username,
            format!("{username}@example.com"),
            "hash",
            vec![Role::new("USER")],
        )
    }

    #[tokio::test]
    async fn lookup_is_tenant_scoped() {
        let store = InMemoryUserStore::new();
        store.create(record(tenant("acme"), "alice")).unwrap();

        let found = store.lookup(&tenant("acme"), "alice").await.unwrap();
        assert!(found.is_some());

        // Same username, different tenant: unrelated population.
        let missing = store.lookup(&tenant("globex"), "alice").await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn duplicate_username_in_tenant_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(record(tenant("acme"), "alice")).unwrap();

        let err = store.create(record(tenant("acme"), "alice")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Same username in another tenant is fine.
        assert!(store.create(record(tenant("globex"), "alice")).is_ok());
    }

    #[test]
    fn deactivate_flips_only_active() {
        let store = InMemoryUserStore::new();
        let created = store.create(record(tenant("acme"), "bob")).unwrap();

        let updated = store.set_active(&tenant("acme"), &created.id, false).unwrap();
        assert!(!updated.active);
        assert_eq!(updated.username, "bob");
        assert_eq!(updated.roles, created.roles);
    }

    #[test]
    fn list_excludes_other_tenants() {
        let store = InMemoryUserStore::new();
        store.create(record(tenant("acme"), "alice")).unwrap();
        store.create(record(tenant("acme"), "bob")).unwrap();
        store.create(record(tenant("globex"), "carol")).unwrap();

        let names: Vec<String> = store
            .list(&tenant("acme"))
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }
}
