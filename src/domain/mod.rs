//! Canonical schemas for every entity kind the dashboard manages.
//!
//! Gateway payloads are normalized into these types at the boundary:
//! `_id` becomes `id`, legacy field names are accepted as aliases, and
//! references may arrive either as bare ids or as populated user objects.

mod inventory;
mod quote;
mod support;
mod user;

pub use inventory::{InventoryItem, InventoryPatch, NewInventoryItem};
pub use quote::{Budget, NewQuoteRequest, QuoteRequest, QuoteRequestPatch, QuoteStatus, Timeline};
pub use support::{NewSupportRequest, RequestStatus, SupportRequest, SupportRequestPatch, Urgency};
pub use user::{NewUser, Role, User, UserPatch, UserRef, UserSummary};

use crate::error::SyncError;

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), SyncError> {
    if value.trim().is_empty() {
        return Err(SyncError::Invalid {
            field,
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

/// Deserialize an optional user reference, treating `""` as unassigned.
pub(crate) fn optional_user_ref<'de, D>(deserializer: D) -> Result<Option<UserRef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let value = Option::<UserRef>::deserialize(deserializer)?;
    Ok(value.filter(|r| !r.id().is_empty()))
}
