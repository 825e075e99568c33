//! Client-side session state.
//!
//! The session is always derived from a token whose signature and expiry
//! were checked; nothing is trusted from an unverified decode.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{dto::LoginResponse, jwt::JwtKeys};

/// Storage key the token is persisted under.
pub const TOKEN_KEY: &str = "jwtToken";

/// Persistent client storage (browser local storage, a keyring, a file...).
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryTokenStorage {
    items: Mutex<HashMap<String, String>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.remove(key);
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("login response did not report success")]
    LoginRejected,
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Identity decoded from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub exp: usize,
}

impl CurrentUser {
    /// Verifies `token`, with or without the `Bearer ` label.
    pub fn from_token(keys: &JwtKeys, token: &str) -> Result<Self, SessionError> {
        let claims = keys
            .verify_labelled(token)
            .map_err(|_| SessionError::InvalidToken)?;
        Ok(CurrentUser {
            id: claims.id,
            name: claims.name,
            avatar: claims.avatar,
            exp: claims.exp,
        })
    }
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    SetCurrentUser(Option<CurrentUser>),
    Logout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub is_authenticated: bool,
    pub user: Option<CurrentUser>,
}

/// What application start-up should do with a stored token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restore {
    Anonymous,
    Authenticated(SessionContext),
    RedirectToLogin,
}

impl SessionContext {
    pub fn set_current_user(decoded: Option<CurrentUser>) -> Self {
        SessionContext {
            is_authenticated: decoded.is_some(),
            user: decoded,
        }
    }

    pub fn reduce(self, action: SessionAction) -> Self {
        match action {
            SessionAction::SetCurrentUser(decoded) => Self::set_current_user(decoded),
            SessionAction::Logout => Self::default(),
        }
    }

    /// Stores the issued token and derives the session from it.
    pub fn from_login(
        storage: &dyn TokenStorage,
        keys: &JwtKeys,
        resp: &LoginResponse,
    ) -> Result<Self, SessionError> {
        if !resp.success {
            return Err(SessionError::LoginRejected);
        }
        let user = CurrentUser::from_token(keys, &resp.token)?;
        storage.set(TOKEN_KEY, resp.token.clone());
        info!(user_id = %user.id, "session started");
        Ok(Self::default().reduce(SessionAction::SetCurrentUser(Some(user))))
    }

    /// Start-up check of a previously stored token.
    pub fn restore(storage: &dyn TokenStorage, keys: &JwtKeys) -> Restore {
        let Some(token) = storage.get(TOKEN_KEY) else {
            return Restore::Anonymous;
        };
        match CurrentUser::from_token(keys, &token) {
            Ok(user) => Restore::Authenticated(Self::set_current_user(Some(user))),
            Err(_) => {
                debug!("stored token rejected; logging out");
                Self::logout(storage);
                Restore::RedirectToLogin
            }
        }
    }

    /// Re-derives the identity for a privileged call.
    pub fn require(keys: &JwtKeys, token: &str) -> Result<CurrentUser, SessionError> {
        CurrentUser::from_token(keys, token)
    }

    pub fn logout(storage: &dyn TokenStorage) -> Self {
        storage.remove(TOKEN_KEY);
        Self::default().reduce(SessionAction::Logout)
    }
}
