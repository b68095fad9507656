//! Controller - turns view intents into gateway calls and store mutations.
//!
//! Each operation runs at most one gateway call per target and never
//! returns an error to the caller: failures are logged and written to the
//! store's error field, leaving the collection in its last known good state.
//! Concurrent operations resolve independently in arrival order.
//!
//! Controllers only hold a weak reference to their store. A response that
//! arrives after the owning [`AdminState`](crate::AdminState) was torn down
//! is dropped and reported as [`SyncOutcome::Detached`].

use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::error::SyncError;
use crate::gateway::Gateway;
use crate::record::{Draft, Operation, Record};
use crate::session::Session;
use crate::store::EntityStore;

/// What an operation did to its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The store changed as requested.
    Applied,
    /// The gateway succeeded but the store had nothing to change (unknown id, duplicate insert).
    Skipped,
    /// The operation failed; the store's error field says why.
    Failed,
    /// The store no longer exists.
    Detached,
}

/// Synchronization controller for one entity kind.
pub struct Controller<G, R: Record> {
    gateway: Arc<G>,
    session: Arc<Session>,
    store: Weak<EntityStore<R>>,
}

impl<G, R: Record> Clone for Controller<G, R> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            session: Arc::clone(&self.session),
            store: Weak::clone(&self.store),
        }
    }
}

impl<G: Gateway, R: Record> Controller<G, R> {
    pub(crate) fn new(gateway: Arc<G>, session: Arc<Session>, store: &Arc<EntityStore<R>>) -> Self {
        Self {
            gateway,
            session,
            store: Arc::downgrade(store),
        }
    }

    /// Read access to the store, while it exists.
    pub fn store(&self) -> Option<Arc<EntityStore<R>>> {
        self.store.upgrade()
    }

    /// Fetch the whole collection and replace the store's contents.
    pub async fn load(&self) -> SyncOutcome {
        let token = match self.begin(Operation::Load) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        if let Some(store) = self.store.upgrade() {
            store.set_loading(true);
        }
        tracing::debug!(collection = R::COLLECTION, "loading");

        let result = self.gateway.list::<R>(&token).await;
        let Some(store) = self.attached("load") else {
            return SyncOutcome::Detached;
        };
        match result {
            Ok(records) => {
                let fetched = records.len();
                store.replace_all(records);
                tracing::info!(
                    collection = R::COLLECTION,
                    fetched,
                    total = store.total_count(),
                    "loaded"
                );
                SyncOutcome::Applied
            }
            Err(err) => self.fail(&store, "load", err.into()),
        }
    }

    /// Create a record and insert the gateway's echo at the head of the store.
    ///
    /// Either the record is inserted or the store is untouched.
    pub async fn create(&self, draft: R::Draft) -> SyncOutcome {
        let token = match self.begin(Operation::Create) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        let body = match draft
            .validate()
            .and_then(|()| draft.to_body().map_err(|err| invalid("draft", err)))
        {
            Ok(body) => body,
            Err(err) => return self.fail_attached("create", err),
        };

        let result = self.gateway.create::<R>(&token, body).await;
        let Some(store) = self.attached("create") else {
            return SyncOutcome::Detached;
        };
        match result {
            Ok(record) => {
                let id = record.id().to_string();
                if store.insert_one(record) {
                    tracing::info!(collection = R::COLLECTION, id = %id, "created");
                    SyncOutcome::Applied
                } else {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        id = %id,
                        "created record already present"
                    );
                    SyncOutcome::Skipped
                }
            }
            Err(err) => self.fail(&store, "create", err.into()),
        }
    }

    /// Send a partial update and merge the same fields into the stored record.
    ///
    /// The gateway's echo is not merged; derived fields are recomputed
    /// locally both for the outgoing body and after the merge.
    pub async fn update(&self, id: &str, patch: R::Patch) -> SyncOutcome {
        let token = match self.begin(Operation::Update) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };
        if let Err(err) = R::validate_patch(&patch) {
            return self.fail_attached("update", err);
        }
        let current = self.store.upgrade().and_then(|store| store.get(id));
        let (body, merge) = match Self::bodies(current.as_ref(), &patch) {
            Ok(bodies) => bodies,
            Err(err) => return self.fail_attached("update", err),
        };

        let result = self.gateway.update::<R>(&token, id, body).await;
        let Some(store) = self.attached("update") else {
            return SyncOutcome::Detached;
        };
        match result {
            Ok(_) => match store.update_one(id, &merge) {
                Ok(true) => {
                    tracing::info!(collection = R::COLLECTION, id, "updated");
                    SyncOutcome::Applied
                }
                Ok(false) => {
                    tracing::debug!(
                        collection = R::COLLECTION,
                        id,
                        "updated record not in store"
                    );
                    SyncOutcome::Skipped
                }
                Err(err) => self.fail(&store, "update", err.into()),
            },
            Err(err) => self.fail(&store, "update", err.into()),
        }
    }

    /// Apply one patch to several records, one gateway call per id.
    ///
    /// Successful ids are merged together; the first failure is recorded.
    pub async fn update_many(&self, ids: &[&str], patch: R::Patch) -> SyncOutcome {
        let token = match self.begin(Operation::Update) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };

        if let Err(err) = R::validate_patch(&patch) {
            return self.fail_attached("update_many", err);
        }
        let merge = match serde_json::to_value(&patch) {
            Ok(merge) => merge,
            Err(err) => return self.fail_attached("update_many", invalid("patch", err)),
        };

        let mut succeeded = Vec::with_capacity(ids.len());
        let mut first_error = None;
        for id in ids {
            let current = self.store.upgrade().and_then(|store| store.get(id));
            let body = match R::outgoing_patch(current.as_ref(), &patch) {
                Ok(body) => body,
                Err(err) => return self.fail_attached("update_many", invalid("patch", err)),
            };
            match self.gateway.update::<R>(&token, id, body).await {
                Ok(_) => succeeded.push(*id),
                Err(err) => {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        id,
                        error = %err,
                        "bulk update item failed"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        let Some(store) = self.attached("update_many") else {
            return SyncOutcome::Detached;
        };
        if !succeeded.is_empty() {
            match store.update_many(&succeeded, &merge) {
                Ok(count) => {
                    tracing::info!(collection = R::COLLECTION, count, "bulk updated")
                }
                Err(err) => return self.fail(&store, "update_many", err.into()),
            }
        }
        match first_error {
            Some(err) => self.fail(&store, "update_many", err.into()),
            None if succeeded.is_empty() => SyncOutcome::Skipped,
            None => SyncOutcome::Applied,
        }
    }

    /// Delete a record remotely, then locally.
    pub async fn remove(&self, id: &str) -> SyncOutcome {
        let token = match self.begin(Operation::Remove) {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };

        let result = self.gateway.delete::<R>(&token, id).await;
        let Some(store) = self.attached("remove") else {
            return SyncOutcome::Detached;
        };
        if let Err(err) = result {
            return self.fail(&store, "remove", err.into());
        }
        if store.delete_one(id) {
            tracing::info!(collection = R::COLLECTION, id, "removed");
            SyncOutcome::Applied
        } else {
            tracing::debug!(collection = R::COLLECTION, id, "removed record not in store");
            SyncOutcome::Skipped
        }
    }

    /// Mark a record as selected for the detail view.
    pub fn select(&self, id: &str) -> SyncOutcome {
        match self.store.upgrade() {
            Some(store) if store.select(id) => SyncOutcome::Applied,
            Some(_) => SyncOutcome::Skipped,
            None => SyncOutcome::Detached,
        }
    }

    pub fn clear_selection(&self) {
        if let Some(store) = self.store.upgrade() {
            store.clear_selection();
        }
    }

    /// The user dismissed the error banner.
    pub fn acknowledge_error(&self) {
        if let Some(store) = self.store.upgrade() {
            store.clear_error();
        }
    }

    /// Check the store, credential and role before any gateway call.
    fn begin(&self, op: Operation) -> Result<String, SyncOutcome> {
        let Some(store) = self.store.upgrade() else {
            return Err(SyncOutcome::Detached);
        };
        let Some(token) = self.session.token() else {
            return Err(self.fail(&store, op_name(op), SyncError::Unauthenticated));
        };
        if let Err(message) = R::authorize(op, self.session.current_user().as_ref()) {
            return Err(self.fail(&store, op_name(op), SyncError::Forbidden(message)));
        }
        Ok(token)
    }

    /// Outgoing body (with derived fields) and the fields to merge locally.
    fn bodies(current: Option<&R>, patch: &R::Patch) -> Result<(Value, Value), SyncError> {
        let body = R::outgoing_patch(current, patch).map_err(|err| invalid("patch", err))?;
        let merge = serde_json::to_value(patch).map_err(|err| invalid("patch", err))?;
        Ok((body, merge))
    }

    fn attached(&self, op: &'static str) -> Option<Arc<EntityStore<R>>> {
        let store = self.store.upgrade();
        if store.is_none() {
            tracing::debug!(collection = R::COLLECTION, op, "store torn down, response discarded");
        }
        store
    }

    fn fail_attached(&self, op: &'static str, err: SyncError) -> SyncOutcome {
        match self.store.upgrade() {
            Some(store) => self.fail(&store, op, err),
            None => SyncOutcome::Detached,
        }
    }

    fn fail(&self, store: &EntityStore<R>, op: &'static str, err: SyncError) -> SyncOutcome {
        if matches!(&err, SyncError::Unauthenticated)
            || matches!(&err, SyncError::Gateway(g) if g.requires_login())
        {
            self.session.reject();
        }
        tracing::warn!(collection = R::COLLECTION, op, error = %err, "operation failed");
        store.set_error(Some(err.user_message()));
        SyncOutcome::Failed
    }
}

fn op_name(op: Operation) -> &'static str {
    match op {
        Operation::Load => "load",
        Operation::Create => "create",
        Operation::Update => "update",
        Operation::Remove => "remove",
    }
}

fn invalid(field: &'static str, err: serde_json::Error) -> SyncError {
    SyncError::Invalid {
        field,
        message: err.to_string(),
    }
}
