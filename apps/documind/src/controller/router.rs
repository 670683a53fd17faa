//! Presentation modes of the shell and the fault boundary around the
//! authenticated dashboard.

use std::io;

use shared::domain::{Identity, Session};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    CheckingSession,
    Anonymous(AuthView),
    Authenticated(Identity),
}

#[derive(Debug)]
pub struct Router {
    mode: ShellMode,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            mode: ShellMode::CheckingSession,
        }
    }

    pub fn mode(&self) -> &ShellMode {
        &self.mode
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.mode {
            ShellMode::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn on_session_resolved(&mut self, session: &Session) {
        self.mode = match session {
            Session::Authenticated(identity) => ShellMode::Authenticated(identity.clone()),
            Session::Anonymous => ShellMode::Anonymous(AuthView::Login),
        };
        info!(mode = ?self.mode, "router: session resolved");
    }

    /// Toggles login/register. Only meaningful while anonymous.
    pub fn switch_auth_view(&mut self) -> bool {
        let ShellMode::Anonymous(view) = self.mode else {
            return false;
        };
        self.mode = ShellMode::Anonymous(match view {
            AuthView::Login => AuthView::Register,
            AuthView::Register => AuthView::Login,
        });
        true
    }

    pub fn on_login(&mut self, identity: Identity) {
        info!(user_id = identity.user_id().0, "router: authenticated");
        self.mode = ShellMode::Authenticated(identity);
    }

    /// After the registration redirect: straight into the dashboard when the
    /// backend acknowledged with an identity, otherwise back to login.
    pub fn on_registered(&mut self, identity: Option<Identity>) {
        match identity {
            Some(identity) => self.on_login(identity),
            None => self.mode = ShellMode::Anonymous(AuthView::Login),
        }
    }

    pub fn on_logout(&mut self) {
        info!("router: logged out");
        self.mode = ShellMode::Anonymous(AuthView::Login);
    }

    pub fn reload(&mut self) {
        self.mode = ShellMode::CheckingSession;
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct RenderFault {
    message: String,
}

impl RenderFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for RenderFault {
    fn from(err: io::Error) -> Self {
        Self::new(format!("failed to draw dashboard: {err}"))
    }
}

/// Catches render faults from the authenticated subtree. Once tripped it
/// stays tripped until [`FaultBoundary::reset`], and guarded renders are
/// skipped.
#[derive(Debug, Default)]
pub struct FaultBoundary {
    fault: Option<RenderFault>,
}

impl FaultBoundary {
    pub fn guard<T>(&mut self, render: impl FnOnce() -> Result<T, RenderFault>) -> Option<T> {
        if self.fault.is_some() {
            return None;
        }
        match render() {
            Ok(value) => Some(value),
            Err(fault) => {
                error!(error = %fault, "dashboard runtime error");
                self.fault = Some(fault);
                None
            }
        }
    }

    pub fn fault(&self) -> Option<&RenderFault> {
        self.fault.as_ref()
    }

    pub fn is_tripped(&self) -> bool {
        self.fault.is_some()
    }

    pub fn reset(&mut self) {
        self.fault = None;
    }
}

#[cfg(test)]
#[path = "../tests/router_tests.rs"]
mod tests;
