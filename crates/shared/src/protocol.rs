use serde::{Deserialize, Serialize};

use crate::domain::{Identity, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Identity as returned by `/auth/me`, `/auth/login` and `/auth/register`.
///
/// The backend is inconsistent about which field carries the id, so both are
/// kept and resolved by priority in [`IdentityPayload::resolve_user_id`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IdentityPayload {
    /// `id` wins when present and non-zero, otherwise `user_id`.
    pub fn resolve_user_id(&self) -> Option<UserId> {
        match (self.id, self.user_id) {
            (Some(id), _) if id != 0 => Some(UserId(id)),
            (_, Some(user_id)) => Some(UserId(user_id)),
            (Some(id), None) => Some(UserId(id)),
            (None, None) => None,
        }
    }

    pub fn resolve_identity(&self) -> Option<Identity> {
        let user_id = self.resolve_user_id()?;
        Identity::new(user_id, self.username.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub user_id: UserId,
    pub question: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

impl QueryResponse {
    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_deref().filter(|answer| !answer.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
