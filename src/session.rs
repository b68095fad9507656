//! Session identity shared by every controller.
//!
//! Holds the bearer credential and the signed-in user as reported by the
//! gateway's `/users/me`. Controllers only read it; the login flow that
//! obtains the token lives outside this crate.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::Role;
use crate::error::SyncError;
use crate::gateway::Gateway;

const PANEL_DENIED: &str = "You do not have access to Admin Panel";

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<CurrentUser>,
    rejected: bool,
}

/// Bearer credential plus the user it belongs to.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// A signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session holding a token whose user is not known yet (see [`Session::verify`]).
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.state.write().token = Some(token.into());
        session
    }

    pub fn login(&self, token: impl Into<String>, user: CurrentUser) {
        let mut state = self.state.write();
        state.token = Some(token.into());
        state.user = Some(user);
        state.rejected = false;
    }

    pub fn logout(&self) {
        let mut state = self.state.write();
        state.token = None;
        state.user = None;
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.read().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().user.as_ref().map(|u| u.role)
    }

    /// True when the view should redirect to the login flow.
    pub fn needs_login(&self) -> bool {
        let state = self.state.read();
        state.token.is_none() || state.rejected
    }

    /// Only staff roles may use the admin panel.
    pub fn has_panel_access(&self) -> bool {
        self.role().map(|r| r.is_staff()).unwrap_or(false)
    }

    /// Record that the gateway rejected the credential.
    pub(crate) fn reject(&self) {
        self.state.write().rejected = true;
    }

    /// Resolve the token to a user and check admin-panel access.
    ///
    /// A plain customer account is signed out. Any gateway failure signs
    /// the session out as well.
    pub async fn verify<G: Gateway>(&self, gateway: &G) -> Result<CurrentUser, SyncError> {
        let Some(token) = self.token() else {
            self.reject();
            return Err(SyncError::Unauthenticated);
        };

        match gateway.me(&token).await {
            Ok(user) if user.role.is_staff() => {
                tracing::info!(user_id = %user.id, role = user.role.as_str(), "session verified");
                self.login(token, user.clone());
                Ok(user)
            }
            Ok(user) => {
                tracing::warn!(user_id = %user.id, "admin panel access denied");
                self.logout();
                Err(SyncError::Forbidden(PANEL_DENIED.into()))
            }
            Err(err) => {
                tracing::warn!(error = %err, "session verification failed");
                self.logout();
                self.reject();
                Err(err.into())
            }
        }
    }
}
