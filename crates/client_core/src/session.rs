use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use shared::{
    domain::{Identity, Session},
    error::IdentityError,
    protocol::{Credentials, IdentityPayload},
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{BackendHandle, ClientError};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PASSWORDS_DIFFER: &str = "Passwords do not match";
const CREDENTIALS_REQUIRED: &str = "Username and password are required";
const REGISTERED_TO_LOGIN: &str = "Account created! Redirecting to login...";
const REGISTERED_SIGNING_IN: &str = "Account created! Signing you in...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Resolved(Session),
    /// Another check was already in flight.
    Suppressed,
}

/// Inline message shown under the login/register form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub message: String,
}

impl AuthFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn from_client_error(err: &ClientError, fallback: &str) -> Self {
        Self::new(err.detail().unwrap_or(fallback))
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub message: String,
    pub identity: Option<Identity>,
}

/// Clears the in-flight flag when the check finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionController {
    backend: Arc<dyn BackendHandle>,
    session: RwLock<Session>,
    checking: AtomicBool,
}

impl SessionController {
    pub fn new(backend: Arc<dyn BackendHandle>) -> Self {
        Self {
            backend,
            session: RwLock::new(Session::Anonymous),
            checking: AtomicBool::new(false),
        }
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    /// Asks the backend who the caller is. Any failure means "not logged in"
    /// and is never reported.
    pub async fn check(&self) -> CheckOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.checking) else {
            debug!("session: check already in flight; suppressed");
            return CheckOutcome::Suppressed;
        };

        let session = match self.backend.current_user().await {
            Ok(payload) => match identity_from(&payload) {
                Ok(identity) => Session::Authenticated(identity),
                Err(err) => {
                    debug!(error = %err, "session: unusable identity; treating as logged out");
                    Session::Anonymous
                }
            },
            Err(err) => {
                debug!(error = %err, "session: check failed; treating as logged out");
                Session::Anonymous
            }
        };

        info!(
            authenticated = session.is_authenticated(),
            user_id = session.user_id().map(|id| id.0),
            "session: check resolved"
        );
        *self.session.write().await = session.clone();
        CheckOutcome::Resolved(session)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthFailure> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthFailure::new(CREDENTIALS_REQUIRED));
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let mut payload = self.backend.login(&credentials).await.map_err(|err| {
            warn!(username, error = %err, "session: login rejected");
            AuthFailure::from_client_error(&err, LOGIN_FAILED)
        })?;
        if payload.username.is_none() {
            payload.username = Some(credentials.username);
        }
        let identity = identity_from(&payload).map_err(|err| {
            warn!(error = %err, "session: login response carried no usable identity");
            AuthFailure::new(LOGIN_FAILED)
        })?;

        info!(user_id = identity.user_id().0, "session: logged in");
        self.adopt(identity.clone()).await;
        Ok(identity)
    }

    /// Submits the registration form. The session itself is left untouched;
    /// the caller decides when to adopt the returned identity.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Registration, AuthFailure> {
        if password != confirm_password {
            return Err(AuthFailure::new(PASSWORDS_DIFFER));
        }
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthFailure::new(CREDENTIALS_REQUIRED));
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let payload = self.backend.register(&credentials).await.map_err(|err| {
            warn!(username, error = %err, "session: registration rejected");
            AuthFailure::from_client_error(&err, REGISTRATION_FAILED)
        })?;

        info!(username, "session: registered");
        let identity = identity_from(&payload).ok();
        let message = if identity.is_some() {
            REGISTERED_SIGNING_IN
        } else {
            REGISTERED_TO_LOGIN
        };
        Ok(Registration {
            message: message.to_string(),
            identity,
        })
    }

    pub async fn adopt(&self, identity: Identity) {
        *self.session.write().await = Session::Authenticated(identity);
    }

    /// Best-effort backend logout; local state is always cleared.
    pub async fn logout(&self) {
        if let Err(err) = self.backend.logout().await {
            warn!(error = %err, "session: logout request failed, proceeding with local logout");
        }
        *self.session.write().await = Session::Anonymous;
        info!("session: logged out");
    }
}

fn identity_from(payload: &IdentityPayload) -> Result<Identity, IdentityError> {
    let user_id = payload
        .resolve_user_id()
        .ok_or_else(|| IdentityError::new("neither `id` nor `user_id` present"))?;
    payload
        .resolve_identity()
        .ok_or_else(|| IdentityError::new(format!("non-positive user id {user_id}")))
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
