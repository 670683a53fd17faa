use std::sync::Arc;

use shared::{
    domain::{Turn, UserId},
    protocol::{QueryRequest, QueryResponse},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{BackendHandle, ClientError};

pub const NO_ANSWER_FALLBACK: &str = "No response generated.";
pub const QUERY_FAILED_TEXT: &str =
    "System Error: Unable to retrieve answer. Please verify document uploads.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("question is empty")]
    Blank,
    #[error("a question is already being answered")]
    Busy,
}

/// Question that has been appended to the transcript and awaits an answer.
#[derive(Debug)]
#[must_use = "a pending question must be completed to leave the sending state"]
pub struct PendingQuestion {
    request: QueryRequest,
}

impl PendingQuestion {
    pub fn question(&self) -> &str {
        &self.request.question
    }
}

/// Transcript of one chat session.
///
/// A submission moves `idle -> sending -> idle`, appending exactly one user
/// turn on entry and one assistant turn on exit.
pub struct ConversationController {
    backend: Arc<dyn BackendHandle>,
    user_id: UserId,
    transcript: Vec<Turn>,
    input: String,
    sending: bool,
    scroll_requested: bool,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn BackendHandle>, user_id: UserId) -> Self {
        Self {
            backend,
            user_id,
            transcript: Vec::new(),
            input: String::new(),
            sending: false,
            scroll_requested: false,
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn can_submit(&self) -> bool {
        !self.sending && !self.input.trim().is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.transcript.is_empty()
    }

    /// Consumes the pending request to bring the newest turn into view.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    /// Validates the input, appends the user turn and enters `sending`.
    pub fn begin_submit(&mut self) -> Result<PendingQuestion, SubmitRejection> {
        if self.sending {
            return Err(SubmitRejection::Busy);
        }
        if self.input.trim().is_empty() {
            return Err(SubmitRejection::Blank);
        }

        let question = std::mem::take(&mut self.input);
        self.transcript.push(Turn::user(question.clone()));
        self.sending = true;
        self.scroll_requested = true;

        Ok(PendingQuestion {
            request: QueryRequest {
                user_id: self.user_id,
                question,
            },
        })
    }

    pub async fn request_answer(
        &self,
        pending: &PendingQuestion,
    ) -> Result<QueryResponse, ClientError> {
        self.backend.ask(&pending.request).await
    }

    /// Appends the assistant turn for `pending` and returns to `idle`.
    /// Failures become a synthetic assistant turn.
    pub fn complete(
        &mut self,
        pending: PendingQuestion,
        result: Result<QueryResponse, ClientError>,
    ) -> &Turn {
        let text = match result {
            Ok(response) => {
                info!(user_id = pending.request.user_id.0, "chat: answer received");
                response
                    .answer_text()
                    .unwrap_or(NO_ANSWER_FALLBACK)
                    .to_string()
            }
            Err(err) => {
                warn!(
                    user_id = pending.request.user_id.0,
                    error = %err,
                    "chat: query failed"
                );
                QUERY_FAILED_TEXT.to_string()
            }
        };

        self.transcript.push(Turn::assistant(text));
        self.sending = false;
        self.scroll_requested = true;
        &self.transcript[self.transcript.len() - 1]
    }

    /// Full round trip: submit, wait for the backend, append the answer.
    pub async fn submit(&mut self) -> Result<&Turn, SubmitRejection> {
        let pending = self.begin_submit()?;
        let result = self.request_answer(&pending).await;
        Ok(self.complete(pending, result))
    }

    /// Drops the whole transcript. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        if self.transcript.is_empty() {
            return false;
        }
        self.transcript.clear();
        self.scroll_requested = true;
        true
    }
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;
