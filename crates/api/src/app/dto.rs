use serde::Deserialize;
use serde_json::json;

use caseworks_auth::UserRecord;
use caseworks_cases::{Case, CasePriority, CaseStatus, UpdateCase};
use caseworks_tenancy::TenantInfo;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    pub case_number: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<CasePriority>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<CaseStatus>,
    pub priority: Option<CasePriority>,
    pub category: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<UpdateCaseRequest> for UpdateCase {
    fn from(req: UpdateCaseRequest) -> Self {
        UpdateCase {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            category: req.category,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Optional list filters; omitted fields do not constrain.
#[derive(Debug, Default, Deserialize)]
pub struct CaseListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// User view without the password hash.
pub fn user_to_json(user: &UserRecord) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "tenant_id": user.tenant_id.to_string(),
        "username": user.username,
        "email": user.email,
        "display_name": user.display_name,
        "roles": user.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "active": user.active,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}

pub fn case_to_json(case: &Case) -> serde_json::Value {
    json!({
        "id": case.id.to_string(),
        "tenant_id": case.tenant_id.to_string(),
        "case_number": case.case_number,
        "title": case.title,
        "description": case.description,
        "status": case.status,
        "priority": case.priority,
        "category": case.category,
        "assigned_to": case.assigned_to,
        "due_date": case.due_date,
        "resolved_date": case.resolved_date,
        "created_at": case.created_at,
        "updated_at": case.updated_at,
    })
}

pub fn tenant_to_json(info: &TenantInfo) -> serde_json::Value {
    json!({
        "tenant_id": info.tenant_id.to_string(),
        "display_name": info.display_name,
        "active": info.active,
        "created_at": info.created_at,
        "updated_at": info.updated_at,
    })
}
