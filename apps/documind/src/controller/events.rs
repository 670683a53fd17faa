//! Error modeling for messages the shell prints outside of controller notices.

use client_core::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    FileSelection,
    Health,
    Command,
}

pub fn classify_connect_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    let unreachable = [
        "failed to connect",
        "connection refused",
        "dns",
        "timed out",
        "error sending request",
    ]
    .iter()
    .any(|needle| lower.contains(needle));
    if unreachable {
        "Server unreachable; check the backend URL and network.".to_string()
    } else {
        format!("Backend error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let category = categorize(context, &message.to_ascii_lowercase());
        Self {
            category,
            context,
            message,
        }
    }

    /// Categorizes by status code rather than text when the backend answered.
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Status { status, .. } if matches!(status.as_u16(), 401 | 403) => {
                UiErrorCategory::Auth
            }
            ClientError::Status { status, .. } if status.is_client_error() => {
                UiErrorCategory::Validation
            }
            ClientError::Status { .. } | ClientError::Decode(_) => UiErrorCategory::Unknown,
        };
        let message = match category {
            UiErrorCategory::Transport => classify_connect_failure(&err.to_string()),
            _ => err.detail().map(str::to_owned).unwrap_or_else(|| err.to_string()),
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn label(&self) -> &'static str {
        match (self.category(), self.context()) {
            (UiErrorCategory::Auth, _) => "Auth",
            (UiErrorCategory::Transport, UiErrorContext::Health) => "Health",
            (UiErrorCategory::Transport, _) => "Transport",
            (UiErrorCategory::Validation, UiErrorContext::FileSelection) => "File",
            (UiErrorCategory::Validation, _) => "Usage",
            (UiErrorCategory::Unknown, _) => "Error",
        }
    }
}

fn categorize(context: UiErrorContext, lower: &str) -> UiErrorCategory {
    if lower.contains("not authenticated") || lower.contains("unauthorized") {
        return UiErrorCategory::Auth;
    }
    if lower.contains("unreachable") || lower.contains("connect") || lower.contains("timed out") {
        return UiErrorCategory::Transport;
    }
    match context {
        UiErrorContext::FileSelection => UiErrorCategory::Validation,
        UiErrorContext::Command
            if lower.starts_with("usage") || lower.contains("unknown command") =>
        {
            UiErrorCategory::Validation
        }
        _ => UiErrorCategory::Unknown,
    }
}
