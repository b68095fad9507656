//! Remote Data Gateway - the REST/JSON API that persists every collection.
//!
//! The [`Gateway`] trait is the only I/O seam in the crate. [`HttpGateway`]
//! talks to the real API over reqwest; [`InMemoryGateway`] is a
//! HashMap-backed stand-in for tests and development.
//!
//! ## Example
//!
//! ```ignore
//! use repairdesk::{Gateway, GatewayConfig, HttpGateway, SupportRequest};
//!
//! let gateway = HttpGateway::new(&GatewayConfig::from_env()?)?;
//! let tickets = gateway.list::<SupportRequest>(&token).await?;
//! ```

mod envelope;
#[cfg(feature = "http")]
mod http;
mod in_memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayError;
use crate::record::Record;
use crate::session::CurrentUser;

pub(crate) use envelope::decode;
#[cfg(feature = "http")]
pub use http::HttpGateway;
pub use in_memory::{GatewayCall, InMemoryGateway};

/// Route that resolves a bearer token to its user.
pub const ME_PATH: &str = "/users/me";

/// CRUD access to the remote collections. Every call carries a bearer token.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Fetch the whole collection.
    async fn list<R: Record>(&self, token: &str) -> Result<Vec<R>, GatewayError>;

    /// Create a record; the gateway echoes it back with its assigned id.
    async fn create<R: Record>(&self, token: &str, body: Value) -> Result<R, GatewayError>;

    /// Apply a partial update. The echoed body may be partial or empty
    /// (`Value::Null`) and is not trusted as the full record.
    async fn update<R: Record>(&self, token: &str, id: &str, body: Value)
        -> Result<Value, GatewayError>;

    async fn delete<R: Record>(&self, token: &str, id: &str) -> Result<(), GatewayError>;

    /// The user owning `token`.
    async fn me(&self, token: &str) -> Result<CurrentUser, GatewayError>;
}
