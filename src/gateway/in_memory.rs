//! InMemoryGateway - HashMap-backed gateway for testing and development.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::{decode, Gateway, ME_PATH};
use crate::domain::{QuoteRequest, SupportRequest};
use crate::error::GatewayError;
use crate::record::{Keyed, Record};
use crate::session::CurrentUser;

const ID_FIELD: &str = "_id";

/// One request observed by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub method: &'static str,
    pub path: String,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<&'static str, Vec<Map<String, Value>>>,
    defaults: HashMap<&'static str, Map<String, Value>>,
    tokens: HashMap<String, CurrentUser>,
    failures: HashMap<&'static str, VecDeque<GatewayError>>,
    offline: bool,
    latency: Option<Duration>,
    calls: Vec<GatewayCall>,
}

/// In-memory [`Gateway`]: assigns ids, applies partial updates, and can be
/// told to fail.
///
/// Clone-friendly via Arc; clones share state.
#[derive(Clone)]
pub struct InMemoryGateway {
    inner: Arc<Mutex<Inner>>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// Empty collections. New tickets and quotes start out `pending`, as the
    /// real API does.
    pub fn new() -> Self {
        let mut inner = Inner::default();
        for collection in [SupportRequest::COLLECTION, QuoteRequest::COLLECTION] {
            let mut defaults = Map::new();
            defaults.insert("status".into(), json!("pending"));
            inner.defaults.insert(collection, defaults);
        }
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Accept `token` as belonging to `user`.
    pub fn with_user(self, token: impl Into<String>, user: CurrentUser) -> Self {
        self.inner.lock().tokens.insert(token.into(), user);
        self
    }

    /// Replace the stored collection for `R` with raw JSON documents.
    pub fn seed_raw<R: Record>(&self, documents: Vec<Value>) {
        let docs = documents
            .into_iter()
            .filter_map(|doc| match doc {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.inner.lock().collections.insert(R::COLLECTION, docs);
    }

    /// Replace the stored collection for `R`.
    pub fn seed<R: Record>(&self, records: &[R]) -> Result<(), GatewayError> {
        let documents = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.seed_raw::<R>(documents);
        Ok(())
    }

    /// Fail the next call that touches `R`'s collection with `error`.
    pub fn fail_next<R: Record>(&self, error: GatewayError) {
        self.inner
            .lock()
            .failures
            .entry(R::COLLECTION)
            .or_default()
            .push_back(error);
    }

    /// While offline, every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.inner.lock().latency = latency;
    }

    /// Raw documents currently stored for `R`.
    pub fn documents<R: Record>(&self) -> Vec<Value> {
        self.inner
            .lock()
            .collections
            .get(R::COLLECTION)
            .map(|docs| docs.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Every request seen so far, in arrival order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().calls.clone()
    }

    async fn delay(&self) {
        let latency = self.inner.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Shared preamble: record the call, then check connectivity, token and
    /// injected failures.
    fn admit(
        inner: &mut Inner,
        method: &'static str,
        path: String,
        collection: Option<&'static str>,
        token: &str,
    ) -> Result<CurrentUser, GatewayError> {
        inner.calls.push(GatewayCall { method, path });
        if inner.offline {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        let user = inner
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| GatewayError::Unauthorized(Some("Invalid token".into())))?;
        if let Some(collection) = collection {
            if let Some(err) = inner.failures.get_mut(collection).and_then(VecDeque::pop_front) {
                return Err(err);
            }
        }
        Ok(user)
    }
}

fn document_id(doc: &Map<String, Value>) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn not_found(collection: &str, id: &str) -> GatewayError {
    GatewayError::NotFound(format!("{} {} not found", collection, id))
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn list<R: Record>(&self, token: &str) -> Result<Vec<R>, GatewayError> {
        self.delay().await;
        let documents = {
            let mut inner = self.inner.lock();
            Self::admit(
                &mut inner,
                "GET",
                R::ENDPOINTS.list.to_string(),
                Some(R::COLLECTION),
                token,
            )?;
            inner
                .collections
                .get(R::COLLECTION)
                .map(|docs| docs.iter().cloned().map(Value::Object).collect())
                .unwrap_or_default()
        };
        decode(Value::Array(documents))
    }

    async fn create<R: Record>(&self, token: &str, body: Value) -> Result<R, GatewayError> {
        self.delay().await;
        let document = {
            let mut inner = self.inner.lock();
            Self::admit(
                &mut inner,
                "POST",
                R::ENDPOINTS.create.to_string(),
                Some(R::COLLECTION),
                token,
            )?;
            let Value::Object(fields) = body else {
                return Err(GatewayError::Api {
                    status: 400,
                    message: Some("body must be a JSON object".into()),
                });
            };

            let mut document = inner.defaults.get(R::COLLECTION).cloned().unwrap_or_default();
            document.extend(fields);
            let now = Utc::now().to_rfc3339();
            document.insert(ID_FIELD.into(), json!(uuid::Uuid::new_v4().simple().to_string()));
            document.insert("createdAt".into(), json!(now));
            document.insert("updatedAt".into(), json!(now));

            inner
                .collections
                .entry(R::COLLECTION)
                .or_default()
                .insert(0, document.clone());
            document
        };
        decode(Value::Object(document))
    }

    async fn update<R: Record>(
        &self,
        token: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, GatewayError> {
        self.delay().await;
        let mut inner = self.inner.lock();
        Self::admit(
            &mut inner,
            "PUT",
            R::ENDPOINTS.update_path(id),
            Some(R::COLLECTION),
            token,
        )?;
        let Value::Object(fields) = body else {
            return Err(GatewayError::Api {
                status: 400,
                message: Some("body must be a JSON object".into()),
            });
        };

        let document = inner
            .collections
            .get_mut(R::COLLECTION)
            .and_then(|docs| docs.iter_mut().find(|doc| document_id(doc) == Some(id)))
            .ok_or_else(|| not_found(R::COLLECTION, id))?;
        for (key, value) in fields {
            if key != ID_FIELD {
                document.insert(key, value);
            }
        }
        document.insert("updatedAt".into(), json!(Utc::now().to_rfc3339()));
        Ok(Value::Object(document.clone()))
    }

    async fn delete<R: Record>(&self, token: &str, id: &str) -> Result<(), GatewayError> {
        self.delay().await;
        let mut inner = self.inner.lock();
        Self::admit(
            &mut inner,
            "DELETE",
            R::ENDPOINTS.delete_path(id),
            Some(R::COLLECTION),
            token,
        )?;
        let docs = inner
            .collections
            .get_mut(R::COLLECTION)
            .ok_or_else(|| not_found(R::COLLECTION, id))?;
        let before = docs.len();
        docs.retain(|doc| document_id(doc) != Some(id));
        if docs.len() == before {
            return Err(not_found(R::COLLECTION, id));
        }
        Ok(())
    }

    async fn me(&self, token: &str) -> Result<CurrentUser, GatewayError> {
        self.delay().await;
        let mut inner = self.inner.lock();
        Self::admit(&mut inner, "GET", ME_PATH.to_string(), None, token)
    }
}
