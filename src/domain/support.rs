use chrono::{DateTime, Utc};
use repairdesk_macros::Keyed;
use serde::{Deserialize, Serialize};

use super::{optional_user_ref, require_non_empty, UserRef};
use crate::error::SyncError;
use crate::record::{Draft, Endpoints, Record, StatusKind};

/// How urgently the customer needs the repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[serde(alias = "Critical")]
    Critical,
    #[serde(alias = "High")]
    High,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
}

impl Urgency {
    pub const ALL: &'static [Urgency] = &[
        Urgency::Critical,
        Urgency::High,
        Urgency::Medium,
        Urgency::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

/// Lifecycle of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Scheduled,
    Resolved,
}

impl StatusKind for RequestStatus {
    const ALL: &'static [Self] = &[
        RequestStatus::Pending,
        RequestStatus::Scheduled,
        RequestStatus::Resolved,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Scheduled => "scheduled",
            RequestStatus::Resolved => "resolved",
        }
    }
}

/// A customer's repair ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Keyed)]
#[keyed(collection = "support_requests")]
pub struct SupportRequest {
    #[keyed(id)]
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: UserRef,
    pub device: String,
    pub issue: String,
    pub urgency: Urgency,
    pub status: RequestStatus,
    #[serde(
        rename = "assignedTechnician",
        alias = "assignedTechnic",
        default,
        deserialize_with = "optional_user_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_technician: Option<UserRef>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "estimatedCompletion", default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(rename = "scheduledDate", default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for opening a ticket on behalf of a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSupportRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub device: String,
    pub issue: String,
    pub urgency: Urgency,
}

impl Draft for NewSupportRequest {
    fn validate(&self) -> Result<(), SyncError> {
        require_non_empty("userId", &self.user_id)?;
        require_non_empty("device", &self.device)?;
        require_non_empty("issue", &self.issue)
    }
}

/// Fields staff may change on a ticket.
///
/// `assigned_technician: Some(None)` unassigns; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupportRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(rename = "assignedTechnician", skip_serializing_if = "Option::is_none")]
    pub assigned_technician: Option<Option<String>>,
    #[serde(rename = "estimatedCompletion", skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(rename = "scheduledDate", skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SupportRequestPatch {
    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn assign(mut self, technician_id: impl Into<String>) -> Self {
        self.assigned_technician = Some(Some(technician_id.into()));
        self
    }

    pub fn unassign(mut self) -> Self {
        self.assigned_technician = Some(None);
        self
    }
}

impl Record for SupportRequest {
    type Status = RequestStatus;
    type Draft = NewSupportRequest;
    type Patch = SupportRequestPatch;

    const ENDPOINTS: Endpoints = Endpoints {
        list: "/requests",
        create: "/supportRequests",
        update: "/requests",
        delete: "/supportRequests",
    };

    fn status(&self) -> Option<RequestStatus> {
        Some(self.status)
    }
}
