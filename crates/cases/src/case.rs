use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caseworks_core::{DomainError, Entity, TenantId};

/// Case identifier (tenant-scoped via the owning store).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(Uuid);

impl CaseId {
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

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CaseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for CaseId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("CaseId: {e}")))?;
        Ok(Self(uuid))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Closed,
    Cancelled,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CasePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl core::str::FromStr for CaseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "PENDING" => Ok(Self::Pending),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::validation(format!("unknown case status: {other}"))),
        }
    }
}

impl core::str::FromStr for CasePriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(DomainError::validation(format!("unknown case priority: {other}"))),
        }
    }
}

/// A business case (ticket/matter) within one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub tenant_id: TenantId,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level update for an existing case. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<CaseStatus>,
    pub priority: Option<CasePriority>,
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Case {
    /// Create a new open case.
    ///
    /// A blank `case_number` gets an auto-generated one.
    pub fn new(
        tenant_id: TenantId,
        case_number: Option<String>,
        title: impl Into<String>,
        description: Option<String>,
        priority: Option<CasePriority>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("case title cannot be empty"));
        }

        let case_number = match case_number.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => n,
            _ => Self::generate_case_number(),
        };

        let now = Utc::now();
        Ok(Self {
            id: CaseId::new(),
            tenant_id,
            case_number,
            title: title.trim().to_string(),
            description,
            status: CaseStatus::Open,
            priority: priority.unwrap_or(CasePriority::Medium),
            category: None,
            assigned_to: None,
            due_date: None,
            resolved_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn generate_case_number() -> String {
        let suffix = Uuid::now_v7().simple().to_string();
        format!("CASE-{}", &suffix[..8].to_uppercase())
    }

    /// Apply a field-level update. Transitioning to `Resolved` stamps
    /// `resolved_date` once; later transitions do not overwrite it.
    pub fn apply_update(&mut self, update: UpdateCase) -> Result<(), DomainError> {
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("case title cannot be empty"));
            }
            self.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(status) = update.status {
            self.set_status(status);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = Some(assigned_to);
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_status(&mut self, status: CaseStatus) {
        self.status = status;
        if status == CaseStatus::Resolved && self.resolved_date.is_none() {
            self.resolved_date = Some(Utc::now());
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.status,
            CaseStatus::Open | CaseStatus::InProgress | CaseStatus::Pending
        ) && self.due_date.is_some_and(|due| due < now)
    }
}

impl Entity for Case {
    type Id = CaseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
