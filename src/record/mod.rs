//! Records - the typed entities held by an entity store.
//!
//! Every entity kind implements [`Keyed`] (usually derived) for its identity
//! and [`Record`] for the parts the store and the controller need: the
//! tracked status, the create/update payload types, and the gateway routes.
//!
//! ## Example
//!
//! ```ignore
//! use repairdesk::{Keyed, Record, Untracked};
//!
//! #[derive(Serialize, Deserialize, Clone, Debug, Keyed)]
//! #[keyed(collection = "notes")]
//! struct Note {
//!     #[keyed(id)]
//!     #[serde(rename = "_id")]
//!     pub id: String,
//!     pub body: String,
//! }
//!
//! impl Record for Note {
//!     type Status = Untracked;
//!     type Draft = NewNote;
//!     type Patch = NotePatch;
//!     const ENDPOINTS: Endpoints = Endpoints::rest("/notes");
//!
//!     fn status(&self) -> Option<Untracked> { None }
//! }
//! ```

mod merge;
mod stats;

use std::fmt::Debug;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::SyncError;
use crate::session::CurrentUser;

pub(crate) use merge::shallow_merge;
pub use stats::Stats;

/// Identity of a record: its collection and server-assigned id.
pub trait Keyed {
    /// The collection name for this record type (e.g., "users", "inventory_items").
    const COLLECTION: &'static str;

    /// Returns the unique, server-assigned identifier of this record.
    fn id(&self) -> &str;
}

/// A closed set of status values that an entity store keeps counts for.
pub trait StatusKind: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Every value, in display order. Each one gets a stats bucket.
    const ALL: &'static [Self];

    /// The wire / display label of this value.
    fn as_str(&self) -> &'static str;
}

/// Status type for records whose store keeps no per-status counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Untracked {}

impl StatusKind for Untracked {
    const ALL: &'static [Self] = &[];

    fn as_str(&self) -> &'static str {
        match *self {}
    }
}

/// Which controller operation is being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Remove,
}

/// Gateway routes for one entity kind, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub list: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

impl Endpoints {
    /// Conventional REST routes: every operation on the same collection path.
    pub const fn rest(path: &'static str) -> Self {
        Self {
            list: path,
            create: path,
            update: path,
            delete: path,
        }
    }

    pub fn update_path(&self, id: &str) -> String {
        format!("{}/{}", self.update, id)
    }

    pub fn delete_path(&self, id: &str) -> String {
        format!("{}/{}", self.delete, id)
    }
}

/// Payload used to create a record through the gateway.
pub trait Draft: Serialize + Clone + Debug + Send + Sync {
    /// Reject obviously invalid payloads before any network call.
    fn validate(&self) -> Result<(), SyncError> {
        Ok(())
    }

    /// The JSON body sent to the gateway.
    fn to_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// An entity kind managed by an [`EntityStore`](crate::EntityStore).
pub trait Record: Keyed + Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Status values counted in the store's stats.
    type Status: StatusKind;
    /// Create payload.
    type Draft: Draft;
    /// Partial update payload. Fields left unset must not serialize.
    type Patch: Serialize + Clone + Debug + Send + Sync;

    const ENDPOINTS: Endpoints;

    /// The current status bucket of this record, if the kind tracks one.
    fn status(&self) -> Option<Self::Status>;

    /// Recompute fields derived from other fields. Called on every record
    /// entering the store and after every merge.
    fn refresh_derived(&mut self) {}

    /// The JSON body sent for an update, given the record as the store
    /// currently knows it.
    fn outgoing_patch(
        _current: Option<&Self>,
        patch: &Self::Patch,
    ) -> Result<Value, serde_json::Error> {
        serde_json::to_value(patch)
    }

    /// Reject invalid patch values before any network call.
    fn validate_patch(_patch: &Self::Patch) -> Result<(), SyncError> {
        Ok(())
    }

    /// Role gate for controller operations. The error is the user-facing message.
    fn authorize(_op: Operation, _user: Option<&CurrentUser>) -> Result<(), String> {
        Ok(())
    }
}

/// Normalize a freshly decoded record before it enters a store.
pub(crate) fn normalized<R: Record>(mut record: R) -> R {
    record.refresh_derived();
    record
}
