use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Application role of the user.
    ///
    /// Supabase puts `authenticated` into the top-level `role` claim, so the
    /// `user_type` entry of the user metadata wins when present.
    pub fn app_role(&self) -> Option<Role> {
        let from_metadata = self
            .metadata
            .as_ref()
            .and_then(|meta| meta.get("user_type"))
            .and_then(|value| value.as_str())
            .and_then(Role::parse);

        from_metadata.or_else(|| self.role.as_deref().and_then(Role::parse))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
    Staff,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn is_staff_or_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Admin => write!(f, "admin"),
            Role::Staff => write!(f, "staff"),
        }
    }
}

/// The authenticated party behind a request, as the booking core sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
    /// Doctor profile linked to the user; only set for doctor callers.
    pub doctor_id: Option<Uuid>,
}

impl Caller {
    pub fn patient(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Patient, doctor_id: None }
    }

    pub fn doctor(user_id: Uuid, doctor_id: Uuid) -> Self {
        Self { user_id, role: Role::Doctor, doctor_id: Some(doctor_id) }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Admin, doctor_id: None }
    }

    pub fn staff(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Staff, doctor_id: None }
    }

    pub fn is_staff_or_admin(&self) -> bool {
        self.role.is_staff_or_admin()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}
