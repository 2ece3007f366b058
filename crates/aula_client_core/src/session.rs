//! The logged-in session: bearer token plus identity and role.
//!
//! One `Session` is created at startup and handed (as `Arc<Session>`) to the gateway and
//! every view. State is persisted in [`Storage`] and broadcast on a `watch` channel so a
//! front-end can react to login/logout without polling.

use crate::error::{ClientError, Result};
use crate::models::{Role, SessionUser};
use crate::storage::Storage;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{info, warn};

const KEY_TOKEN: &str = "token";
const KEY_USER: &str = "session_user";

#[derive(Clone, Debug, Default)]
struct State {
    token: Option<String>,
    user: Option<SessionUser>,
}

pub struct Session {
    storage: Storage,
    state: Mutex<State>,
    tx: watch::Sender<Option<SessionUser>>,
}

impl Session {
    /// Open the session persisted under `dir`, restoring any previous login.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_storage(Storage::open(dir)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_storage(Storage::in_memory()?)
    }

    pub fn from_storage(storage: Storage) -> Result<Self> {
        let token = storage.config_get(KEY_TOKEN)?;
        let user = match storage.config_get(KEY_USER)? {
            Some(raw) => match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable stored session user");
                    None
                }
            },
            None => None,
        };
        // A token without a user (or the reverse) is a half-written login.
        let state = match (token, user) {
            (Some(token), Some(user)) => State {
                token: Some(token),
                user: Some(user),
            },
            _ => State::default(),
        };
        let (tx, _rx) = watch::channel(state.user.clone());
        Ok(Self {
            storage,
            state: Mutex::new(state),
            tx,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.lock().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.lock().user.as_ref().map(|u| u.role.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        let state = self.lock();
        state.token.is_some() && state.user.is_some()
    }

    pub fn sign_in(&self, token: String, user: SessionUser) -> Result<()> {
        let user_json = serde_json::to_string(&user)?;
        {
            let mut state = self.lock();
            self.storage.config_set(KEY_TOKEN, &token)?;
            self.storage.config_set(KEY_USER, &user_json)?;
            state.token = Some(token);
            state.user = Some(user.clone());
        }
        info!(user_id = %user.user_id, role = %user.role, "signed in");
        self.tx.send_replace(Some(user));
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        {
            let mut state = self.lock();
            self.storage.config_remove(KEY_TOKEN)?;
            self.storage.config_remove(KEY_USER)?;
            *state = State::default();
        }
        info!("signed out");
        self.tx.send_replace(None);
        Ok(())
    }

    /// Receiver that yields the current user now and after every sign-in/sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.tx.subscribe()
    }

    /// The current user, if logged in with `required`; otherwise `NotLoggedIn` or `Forbidden`.
    pub fn require_role(&self, required: Role) -> Result<SessionUser> {
        let user = self.current().ok_or(ClientError::NotLoggedIn)?;
        if user.role != required {
            return Err(ClientError::Forbidden { required });
        }
        Ok(user)
    }

    pub fn require_user(&self) -> Result<SessionUser> {
        self.current().ok_or(ClientError::NotLoggedIn)
    }
}

/// Claims read from a JWT payload. The signature is not checked.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default, alias = "sub")]
    pub username: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a JWT. Opaque tokens yield `None`.
pub fn token_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let (_header, payload) = (parts.next()?, parts.next()?);
    parts.next()?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
