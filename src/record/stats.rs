//! Per-status counters kept alongside a record collection.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::StatusKind;

/// Count of records per status value. Every value of `S::ALL` has a bucket,
/// starting at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats<S: StatusKind> {
    counts: BTreeMap<S, usize>,
}

impl<S: StatusKind> Default for Stats<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StatusKind> Stats<S> {
    /// All buckets at zero.
    pub fn new() -> Self {
        Self {
            counts: S::ALL.iter().map(|s| (*s, 0)).collect(),
        }
    }

    /// Recount from scratch.
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
    {
        let mut stats = Self::new();
        for status in statuses.into_iter().flatten() {
            stats.increment(status);
        }
        stats
    }

    /// Number of records currently holding `status`.
    pub fn get(&self, status: S) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        self.counts.iter().map(|(s, n)| (*s, *n))
    }

    /// Sum of all buckets.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub(crate) fn increment(&mut self, status: S) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub(crate) fn decrement(&mut self, status: S) {
        if let Some(count) = self.counts.get_mut(&status) {
            *count = count.saturating_sub(1);
        }
    }

    /// Move one record from `from` to `to`. No-op when they are equal.
    pub(crate) fn transfer(&mut self, from: Option<S>, to: Option<S>) {
        if from == to {
            return;
        }
        if let Some(from) = from {
            self.decrement(from);
        }
        if let Some(to) = to {
            self.increment(to);
        }
    }
}

impl<S: StatusKind> Serialize for Stats<S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (status, count) in &self.counts {
            map.serialize_entry(status.as_str(), count)?;
        }
        map.end()
    }
}
