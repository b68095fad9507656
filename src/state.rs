//! Application state - the four entity stores plus the session they share.
//!
//! Build one [`AdminState`] per signed-in dashboard, hand out read access to
//! the stores and controllers to the views, and call
//! [`AdminState::teardown`] when the dashboard closes. Controllers created
//! from it keep working after teardown but their responses are discarded.

use std::sync::Arc;

use crate::controller::{Controller, SyncOutcome};
use crate::domain::{InventoryItem, QuoteRequest, SupportRequest, User};
use crate::error::SyncError;
use crate::gateway::Gateway;
use crate::record::Record;
use crate::session::{CurrentUser, Session};
use crate::store::EntityStore;

pub struct AdminState<G: Gateway> {
    gateway: Arc<G>,
    session: Arc<Session>,
    users: Arc<EntityStore<User>>,
    support_requests: Arc<EntityStore<SupportRequest>>,
    quote_requests: Arc<EntityStore<QuoteRequest>>,
    inventory: Arc<EntityStore<InventoryItem>>,
}

/// Outcome of [`AdminState::load_all`], one per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub users: SyncOutcome,
    pub support_requests: SyncOutcome,
    pub quote_requests: SyncOutcome,
    pub inventory: SyncOutcome,
}

impl LoadReport {
    pub fn all_applied(&self) -> bool {
        [
            self.users,
            self.support_requests,
            self.quote_requests,
            self.inventory,
        ]
        .iter()
        .all(|outcome| *outcome == SyncOutcome::Applied)
    }
}

impl<G: Gateway> AdminState<G> {
    pub fn new(gateway: G, session: Session) -> Self {
        Self::with_shared(Arc::new(gateway), Arc::new(session))
    }

    /// Build from a gateway and session that are shared with other owners.
    pub fn with_shared(gateway: Arc<G>, session: Arc<Session>) -> Self {
        Self {
            gateway,
            session,
            users: Arc::new(EntityStore::new()),
            support_requests: Arc::new(EntityStore::new()),
            quote_requests: Arc::new(EntityStore::new()),
            inventory: Arc::new(EntityStore::new()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn users(&self) -> Controller<G, User> {
        self.controller(&self.users)
    }

    pub fn support_requests(&self) -> Controller<G, SupportRequest> {
        self.controller(&self.support_requests)
    }

    pub fn quote_requests(&self) -> Controller<G, QuoteRequest> {
        self.controller(&self.quote_requests)
    }

    pub fn inventory(&self) -> Controller<G, InventoryItem> {
        self.controller(&self.inventory)
    }

    pub fn user_store(&self) -> &EntityStore<User> {
        &self.users
    }

    pub fn support_store(&self) -> &EntityStore<SupportRequest> {
        &self.support_requests
    }

    pub fn quote_store(&self) -> &EntityStore<QuoteRequest> {
        &self.quote_requests
    }

    pub fn inventory_store(&self) -> &EntityStore<InventoryItem> {
        &self.inventory
    }

    /// Resolve the session token against the gateway.
    pub async fn verify_session(&self) -> Result<CurrentUser, SyncError> {
        self.session.verify(self.gateway.as_ref()).await
    }

    /// Load every collection concurrently.
    pub async fn load_all(&self) -> LoadReport {
        let (users, support, quotes, inventory) = (
            self.users(),
            self.support_requests(),
            self.quote_requests(),
            self.inventory(),
        );
        let (users, support_requests, quote_requests, inventory) =
            tokio::join!(users.load(), support.load(), quotes.load(), inventory.load());
        LoadReport {
            users,
            support_requests,
            quote_requests,
            inventory,
        }
    }

    /// Drop every store. In-flight responses resolve to [`SyncOutcome::Detached`].
    pub fn teardown(self) {
        tracing::info!(
            users = self.users.total_count(),
            support_requests = self.support_requests.total_count(),
            quote_requests = self.quote_requests.total_count(),
            inventory = self.inventory.total_count(),
            "admin state torn down"
        );
    }

    fn controller<R: Record>(&self, store: &Arc<EntityStore<R>>) -> Controller<G, R> {
        Controller::new(Arc::clone(&self.gateway), Arc::clone(&self.session), store)
    }
}
