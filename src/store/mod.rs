//! EntityStore - the authoritative client-side copy of one collection.
//!
//! A store holds the records of one entity kind, most-recent-first, with a
//! `total_count` and per-status `stats` that are kept consistent by every
//! mutation. It performs no I/O and cannot fail on valid input: unknown ids
//! are no-ops so that stale UI actions degrade gracefully.
//!
//! Mutations are crate-private; only the [`Controller`](crate::Controller)
//! changes a store. The view layer reads snapshots and can
//! [`subscribe`](EntityStore::subscribe) to a revision counter to know when
//! to re-render.
//!
//! ## Example
//!
//! ```ignore
//! let store = state.support_store();
//! let pending = store.read(|s| s.stats().get(RequestStatus::Pending));
//! let mut changes = store.subscribe();
//! changes.changed().await?;
//! ```

mod state;

use std::collections::HashSet;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::MergeError;
use crate::record::{normalized, shallow_merge, Record, Stats};

pub use state::StoreState;

/// Client-side collection of `R` plus derived aggregates.
pub struct EntityStore<R: Record> {
    state: RwLock<StoreState<R>>,
    revision: watch::Sender<u64>,
}

impl<R: Record> Default for EntityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> EntityStore<R> {
    /// An empty store.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreState::default()),
            revision,
        }
    }

    /// Run `f` against the current state under a read lock.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState<R>) -> T) -> T {
        f(&self.state.read())
    }

    /// A cloned copy of the current state.
    pub fn snapshot(&self) -> StoreState<R> {
        self.state.read().clone()
    }

    pub fn total_count(&self) -> usize {
        self.state.read().total_count
    }

    pub fn stats(&self) -> Stats<R::Status> {
        self.state.read().stats.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.state.read().get(id).cloned()
    }

    pub fn selected(&self) -> Option<R> {
        self.state.read().selected().cloned()
    }

    /// Revision counter bumped after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Apply `f` under the write lock; publish a new revision if it reports a change.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState<R>) -> (T, bool)) -> T {
        let (result, changed) = {
            let mut state = self.state.write();
            f(&mut state)
        };
        if changed {
            self.revision.send_modify(|rev| *rev += 1);
        }
        result
    }

    /// Replace the whole collection and recount every aggregate.
    ///
    /// Duplicate ids keep their first occurrence. Clears the loading and error flags.
    pub(crate) fn replace_all(&self, records: Vec<R>) {
        self.mutate(|state| {
            let mut seen = HashSet::with_capacity(records.len());
            let mut unique = Vec::with_capacity(records.len());
            for record in records {
                if seen.insert(record.id().to_string()) {
                    unique.push(normalized(record));
                } else {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        id = record.id(),
                        "dropping duplicate id"
                    );
                }
            }

            state.stats = Stats::tally(unique.iter().map(R::status));
            state.total_count = unique.len();
            state.records = unique;
            state.loading = false;
            state.error = None;
            if state.selected().is_none() {
                state.selected = None;
            }
            ((), true)
        })
    }

    /// Insert a newly created record at the front.
    ///
    /// Returns false, leaving the store untouched, if the id is already present.
    pub(crate) fn insert_one(&self, record: R) -> bool {
        self.mutate(|state| {
            if state.position(record.id()).is_some() {
                return (false, false);
            }
            let record = normalized(record);
            if let Some(status) = record.status() {
                state.stats.increment(status);
            }
            state.records.insert(0, record);
            state.total_count += 1;
            (true, true)
        })
    }

    /// Shallow-merge `patch` onto the record with `id`.
    ///
    /// Returns `Ok(false)` if no such record exists. A status change moves
    /// one count between buckets within the same write.
    pub(crate) fn update_one(&self, id: &str, patch: &Value) -> Result<bool, MergeError> {
        self.mutate(|state| match Self::merge_at(state, id, patch) {
            Ok(applied) => (Ok(applied), applied),
            Err(err) => (Err(err), false),
        })
    }

    /// Shallow-merge `patch` onto every listed record that exists.
    ///
    /// All-or-nothing: if any merge fails, no record changes. Returns the
    /// number of records updated.
    pub(crate) fn update_many(&self, ids: &[&str], patch: &Value) -> Result<usize, MergeError> {
        self.mutate(|state| {
            let mut merged = Vec::with_capacity(ids.len());
            for id in ids {
                let Some(index) = state.position(id) else {
                    continue;
                };
                match shallow_merge(&state.records[index], patch) {
                    Ok(record) => merged.push((index, record)),
                    Err(err) => return (Err(err), false),
                }
            }

            let count = merged.len();
            for (index, record) in merged {
                Self::replace_at(state, index, record);
            }
            (Ok(count), count > 0)
        })
    }

    /// Remove the record with `id`. Returns false if it was not present.
    pub(crate) fn delete_one(&self, id: &str) -> bool {
        self.mutate(|state| {
            let Some(index) = state.position(id) else {
                return (false, false);
            };
            let removed = state.records.remove(index);
            if let Some(status) = removed.status() {
                state.stats.decrement(status);
            }
            state.total_count -= 1;
            if state.selected.as_deref() == Some(id) {
                state.selected = None;
            }
            (true, true)
        })
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.mutate(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            ((), changed)
        })
    }

    /// Set or clear the error message. Setting an error also ends loading.
    pub(crate) fn set_error(&self, error: Option<String>) {
        self.mutate(|state| {
            if error.is_some() {
                state.loading = false;
            }
            state.error = error;
            ((), true)
        })
    }

    pub(crate) fn clear_error(&self) {
        self.mutate(|state| ((), state.error.take().is_some()))
    }

    /// Select the record with `id`. Returns false if it is not present.
    pub(crate) fn select(&self, id: &str) -> bool {
        self.mutate(|state| {
            if state.position(id).is_none() {
                return (false, false);
            }
            state.selected = Some(id.to_string());
            (true, true)
        })
    }

    pub(crate) fn clear_selection(&self) {
        self.mutate(|state| ((), state.selected.take().is_some()))
    }

    fn merge_at(state: &mut StoreState<R>, id: &str, patch: &Value) -> Result<bool, MergeError> {
        let Some(index) = state.position(id) else {
            return Ok(false);
        };
        let merged = shallow_merge(&state.records[index], patch)?;
        Self::replace_at(state, index, merged);
        Ok(true)
    }

    fn replace_at(state: &mut StoreState<R>, index: usize, record: R) {
        let old_status = state.records[index].status();
        let new_status = record.status();
        state.records[index] = record;
        state.stats.transfer(old_status, new_status);
    }
}
