use chrono::{DateTime, Utc};
use repairdesk_macros::Keyed;
use serde::{Deserialize, Serialize};

use super::{optional_user_ref, require_non_empty, UserRef};
use crate::error::SyncError;
use crate::record::{Draft, Endpoints, Record, StatusKind};

/// Requested turnaround for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "express")]
    Express,
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "sameDay", alias = "sameday", alias = "same-day")]
    SameDay,
}

impl Timeline {
    pub const ALL: &'static [Timeline] =
        &[Timeline::Express, Timeline::Standard, Timeline::SameDay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::Express => "express",
            Timeline::Standard => "standard",
            Timeline::SameDay => "sameDay",
        }
    }
}

/// Lifecycle of a quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Pending,
    Reviewed,
    Quoted,
    Accepted,
    Declined,
}

impl StatusKind for QuoteStatus {
    const ALL: &'static [Self] = &[
        QuoteStatus::Pending,
        QuoteStatus::Reviewed,
        QuoteStatus::Quoted,
        QuoteStatus::Accepted,
        QuoteStatus::Declined,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Reviewed => "reviewed",
            QuoteStatus::Quoted => "quoted",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Declined => "declined",
        }
    }
}

/// Customer budget: either a number or a free-form bracket like `"$100-$250"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Budget {
    Amount(f64),
    Range(String),
}

impl Budget {
    pub fn label(&self) -> String {
        match self {
            Budget::Amount(amount) => format!("{:.2}", amount),
            Budget::Range(range) => range.clone(),
        }
    }
}

/// A request for a repair estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Keyed)]
#[keyed(collection = "quote_requests")]
pub struct QuoteRequest {
    #[keyed(id)]
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: UserRef,
    #[serde(rename = "serviceType")]
    pub service_type: String,
    pub timeline: Timeline,
    pub budget: Budget,
    pub status: QuoteStatus,
    #[serde(rename = "quotedAmount", default, skip_serializing_if = "Option::is_none")]
    pub quoted_amount: Option<f64>,
    #[serde(rename = "adminNotes", default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
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
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewQuoteRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "serviceType")]
    pub service_type: String,
    pub timeline: Timeline,
    pub budget: Budget,
}

impl Draft for NewQuoteRequest {
    fn validate(&self) -> Result<(), SyncError> {
        require_non_empty("userId", &self.user_id)?;
        require_non_empty("serviceType", &self.service_type)?;
        if let Budget::Amount(amount) = self.budget {
            if amount.is_nan() || amount < 0.0 {
                return Err(SyncError::Invalid {
                    field: "budget",
                    message: "must not be negative".into(),
                });
            }
        }
        Ok(())
    }
}

/// Fields staff may change on a quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QuoteStatus>,
    #[serde(rename = "quotedAmount", skip_serializing_if = "Option::is_none")]
    pub quoted_amount: Option<f64>,
    #[serde(rename = "adminNotes", skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(rename = "assignedTechnician", skip_serializing_if = "Option::is_none")]
    pub assigned_technician: Option<Option<String>>,
}

impl QuoteRequestPatch {
    pub fn status(status: QuoteStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Mark the request quoted at `amount`.
    pub fn quote(amount: f64) -> Self {
        Self {
            status: Some(QuoteStatus::Quoted),
            quoted_amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = Some(notes.into());
        self
    }

    pub fn assign(mut self, technician_id: impl Into<String>) -> Self {
        self.assigned_technician = Some(Some(technician_id.into()));
        self
    }
}

impl Record for QuoteRequest {
    type Status = QuoteStatus;
    type Draft = NewQuoteRequest;
    type Patch = QuoteRequestPatch;

    const ENDPOINTS: Endpoints = Endpoints::rest("/quoteRequests");

    fn status(&self) -> Option<QuoteStatus> {
        Some(self.status)
    }

    fn validate_patch(patch: &QuoteRequestPatch) -> Result<(), SyncError> {
        match patch.quoted_amount {
            Some(amount) if !amount.is_finite() || amount < 0.0 => Err(SyncError::Invalid {
                field: "quotedAmount",
                message: "must be a non-negative amount".into(),
            }),
            _ => Ok(()),
        }
    }
}
