use chrono::{DateTime, Utc};
use repairdesk_macros::Keyed;
use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::error::SyncError;
use crate::record::{Draft, Endpoints, Operation, Record, Untracked};
use crate::session::CurrentUser;

/// Account role. Stores never change it; only presence in the collection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Technician,
    Admin,
    #[serde(rename = "super admin", alias = "superadmin", alias = "super_admin")]
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Technician => "technician",
            Role::Admin => "admin",
            Role::SuperAdmin => "super admin",
        }
    }

    /// Staff roles may use the admin panel at all.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::User)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// A customer or staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Keyed)]
#[keyed(collection = "users")]
pub struct User {
    #[keyed(id)]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Minimal user shape embedded in other records when the gateway populates a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Reference to a [`User`], either by id or populated inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated(UserSummary),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated(summary) => &summary.id,
        }
    }

    /// Display name, only known when the reference was populated.
    pub fn name(&self) -> Option<&str> {
        match self {
            UserRef::Id(_) => None,
            UserRef::Populated(summary) => Some(&summary.name),
        }
    }
}

impl From<&str> for UserRef {
    fn from(id: &str) -> Self {
        UserRef::Id(id.to_string())
    }
}

/// Payload for adding a staff or customer account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

impl Draft for NewUser {
    fn validate(&self) -> Result<(), SyncError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("password", &self.password)?;
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(SyncError::Invalid {
                field: "email",
                message: format!("'{}' is not an email address", email),
            }),
        }
    }
}

/// Profile fields an admin may change. Role is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Record for User {
    type Status = Untracked;
    type Draft = NewUser;
    type Patch = UserPatch;

    const ENDPOINTS: Endpoints = Endpoints {
        list: "/users",
        create: "/users/add-user",
        update: "/users",
        delete: "/users",
    };

    fn status(&self) -> Option<Untracked> {
        None
    }

    fn authorize(op: Operation, user: Option<&CurrentUser>) -> Result<(), String> {
        match op {
            Operation::Create | Operation::Remove
                if !user.map(|u| u.role.is_admin()).unwrap_or(false) =>
            {
                Err("Only administrators can add or remove accounts.".into())
            }
            _ => Ok(()),
        }
    }
}
