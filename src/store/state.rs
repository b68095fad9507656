//! StoreState - the value an entity store guards.

use serde::Serialize;

use crate::record::{Record, Stats};

/// One collection plus its aggregates and display flags.
///
/// Records are kept most-recent-first. `total_count` and `stats` always
/// describe exactly the records in `records`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct StoreState<R: Record> {
    pub(super) records: Vec<R>,
    pub(super) total_count: usize,
    pub(super) stats: Stats<R::Status>,
    pub(super) loading: bool,
    pub(super) error: Option<String>,
    pub(super) selected: Option<String>,
}

impl<R: Record> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_count: 0,
            stats: Stats::new(),
            loading: false,
            error: None,
            selected: None,
        }
    }
}

impl<R: Record> StoreState<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn stats(&self) -> &Stats<R::Status> {
        &self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// The selected record, if it is still in the collection.
    pub fn selected(&self) -> Option<&R> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub(super) fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}
