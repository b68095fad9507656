//! HTTP gateway over reqwest.
//!
//! Requires the `http` feature.
//!
//! Non-2xx responses are expected to carry `{ "message": "..." }`; that
//! message becomes the user-facing error, otherwise a generic fallback is used.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use super::{decode, Gateway, ME_PATH};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::record::Record;
use crate::session::CurrentUser;

const JSON: &str = "application/json";

/// [`Gateway`] backed by the real REST API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a client from configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Use an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else if status.is_success() {
            serde_json::from_slice(&bytes)?
        } else {
            // Error bodies are not always JSON; keep the status either way.
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        tracing::debug!(status = status.as_u16(), message = ?message, "gateway error response");

        Err(match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthorized(message),
            StatusCode::NOT_FOUND => {
                GatewayError::NotFound(message.unwrap_or_else(|| "record not found".into()))
            }
            _ => GatewayError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list<R: Record>(&self, token: &str) -> Result<Vec<R>, GatewayError> {
        let body = self
            .send(self.request(Method::GET, R::ENDPOINTS.list, token))
            .await?;
        decode(body)
    }

    async fn create<R: Record>(&self, token: &str, body: Value) -> Result<R, GatewayError> {
        let request = self
            .request(Method::POST, R::ENDPOINTS.create, token)
            .json(&body);
        decode(self.send(request).await?)
    }

    async fn update<R: Record>(
        &self,
        token: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, GatewayError> {
        let request = self
            .request(Method::PUT, &R::ENDPOINTS.update_path(id), token)
            .json(&body);
        self.send(request).await
    }

    async fn delete<R: Record>(&self, token: &str, id: &str) -> Result<(), GatewayError> {
        self.send(self.request(Method::DELETE, &R::ENDPOINTS.delete_path(id), token))
            .await?;
        Ok(())
    }

    async fn me(&self, token: &str) -> Result<CurrentUser, GatewayError> {
        let body = self.send(self.request(Method::GET, ME_PATH, token)).await?;
        decode(body)
    }
}
