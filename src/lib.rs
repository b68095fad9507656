//! Client-side entity stores and REST synchronization for the repair-shop
//! admin dashboard.
//!
//! One [`EntityStore`] per entity kind holds the collection plus status
//! counts that stay consistent under every mutation. A [`Controller`] per
//! store turns view intents into [`Gateway`] calls and folds their results
//! (or failures) back into the store. [`AdminState`] wires the four stores
//! to one gateway and [`Session`].

extern crate self as repairdesk;

mod config;
mod controller;
mod domain;
mod error;
mod gateway;
mod query;
mod record;
mod session;
mod state;
mod status;
mod store;

pub use config::{ConfigError, GatewayConfig, API_URL_ENV, TIMEOUT_ENV};
pub use controller::{Controller, SyncOutcome};
pub use domain::{
    Budget, InventoryItem, InventoryPatch, NewInventoryItem, NewQuoteRequest, NewSupportRequest,
    NewUser, QuoteRequest, QuoteRequestPatch, QuoteStatus, RequestStatus, Role, SupportRequest,
    SupportRequestPatch, Timeline, Urgency, User, UserPatch, UserRef, UserSummary,
};
pub use error::{GatewayError, MergeError, SyncError, API_FAILED_MESSAGE, NETWORK_ERROR_MESSAGE};
#[cfg(feature = "http")]
pub use gateway::HttpGateway;
pub use gateway::{Gateway, GatewayCall, InMemoryGateway, ME_PATH};
pub use query::{
    Filter, InventoryFilter, InventorySummary, QuoteFilter, SupportFilter, UserFilter,
};
pub use record::{
    Draft, Endpoints, Keyed, Operation, Record, Stats, StatusKind, Untracked,
};
pub use session::{CurrentUser, Session};
pub use state::{AdminState, LoadReport};
pub use status::{Badge, StockStatus, Tone};
pub use store::{EntityStore, StoreState};

// Derive macro for `Keyed`, re-exported so records can `use repairdesk::Keyed`.
pub use repairdesk_macros::Keyed;
