//! In-memory `BackendHandle` used by controller tests.

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use shared::{
    domain::{Document, DocumentId, UserId},
    protocol::{Credentials, HealthStatus, IdentityPayload, MessageAck, QueryRequest, QueryResponse},
};
use tokio::sync::Notify;

use crate::{upload::PendingFile, BackendHandle, ClientError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentUser,
    Login(String),
    Register(String),
    Logout,
    List(UserId),
    Delete(DocumentId),
    DeleteAll(UserId),
    Upload(UserId, String),
    Ask(UserId, String),
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CurrentUser,
    Login,
    Register,
    Logout,
    List,
    Delete,
    DeleteAll,
    Upload,
    Ask,
}

pub enum Answer {
    Ok(QueryResponse),
    Fail(u16),
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    identity: Option<IdentityPayload>,
    failures: HashSet<Op>,
    failure_detail: Option<String>,
    documents: Vec<Document>,
    next_document_id: i64,
    answers: VecDeque<Answer>,
}

/// Behaves like a consistent backend: uploads add documents, deletes remove
/// them, and `list` reports what is stored.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    current_user_gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(self, payload: IdentityPayload) -> Self {
        self.state.lock().expect("state").identity = Some(payload);
        self
    }

    /// `current_user` waits on the returned gate before answering.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.current_user_gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_documents(self, names: &[&str]) -> Self {
        for name in names {
            self.store_document(name);
        }
        self
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().expect("state").failures.insert(op);
    }

    pub fn fail_with_detail(&self, op: Op, detail: &str) {
        let mut state = self.state.lock().expect("state");
        state.failures.insert(op);
        state.failure_detail = Some(detail.to_string());
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().expect("state").failures.remove(&op);
    }

    pub fn push_answer(&self, answer: Answer) {
        self.state.lock().expect("state").answers.push_back(answer);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("state").calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    pub fn stored_ids(&self) -> Vec<DocumentId> {
        self.state
            .lock()
            .expect("state")
            .documents
            .iter()
            .map(|doc| doc.id)
            .collect()
    }

    fn store_document(&self, name: &str) -> DocumentId {
        let mut state = self.state.lock().expect("state");
        state.next_document_id += 1;
        let id = DocumentId(state.next_document_id);
        let uploaded_at = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .expect("timestamp");
        state.documents.push(Document {
            id,
            file_name: name.to_string(),
            uploaded_at,
        });
        id
    }

    fn record(&self, call: Call, op: Op) -> Result<(), ClientError> {
        let mut state = self.state.lock().expect("state");
        state.calls.push(call);
        if state.failures.contains(&op) {
            return Err(ClientError::status(
                StatusCode::INTERNAL_SERVER_ERROR,
                state.failure_detail.clone(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendHandle for FakeBackend {
    async fn current_user(&self) -> Result<IdentityPayload, ClientError> {
        if let Some(gate) = &self.current_user_gate {
            gate.notified().await;
        }
        self.record(Call::CurrentUser, Op::CurrentUser)?;
        self.state
            .lock()
            .expect("state")
            .identity
            .clone()
            .ok_or_else(|| {
                ClientError::status(StatusCode::UNAUTHORIZED, Some("Not authenticated".into()))
            })
    }

    async fn login(&self, credentials: &Credentials) -> Result<IdentityPayload, ClientError> {
        self.record(Call::Login(credentials.username.clone()), Op::Login)?;
        Ok(self
            .state
            .lock()
            .expect("state")
            .identity
            .clone()
            .unwrap_or_default())
    }

    async fn register(&self, credentials: &Credentials) -> Result<IdentityPayload, ClientError> {
        self.record(Call::Register(credentials.username.clone()), Op::Register)?;
        Ok(self
            .state
            .lock()
            .expect("state")
            .identity
            .clone()
            .unwrap_or_default())
    }

    async fn logout(&self) -> Result<MessageAck, ClientError> {
        self.record(Call::Logout, Op::Logout)?;
        Ok(MessageAck {
            message: Some("Logout successful".into()),
        })
    }

    async fn list_documents(&self, user_id: UserId) -> Result<Vec<Document>, ClientError> {
        self.record(Call::List(user_id), Op::List)?;
        Ok(self.state.lock().expect("state").documents.clone())
    }

    async fn delete_document(&self, document_id: DocumentId) -> Result<(), ClientError> {
        self.record(Call::Delete(document_id), Op::Delete)?;
        self.state
            .lock()
            .expect("state")
            .documents
            .retain(|doc| doc.id != document_id);
        Ok(())
    }

    async fn delete_all_documents(&self, user_id: UserId) -> Result<(), ClientError> {
        self.record(Call::DeleteAll(user_id), Op::DeleteAll)?;
        self.state.lock().expect("state").documents.clear();
        Ok(())
    }

    async fn upload_document(
        &self,
        user_id: UserId,
        file: &PendingFile,
    ) -> Result<(), ClientError> {
        self.record(Call::Upload(user_id, file.name().to_string()), Op::Upload)?;
        self.store_document(file.name());
        Ok(())
    }

    async fn ask(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        self.record(Call::Ask(request.user_id, request.question.clone()), Op::Ask)?;
        let answer = self.state.lock().expect("state").answers.pop_front();
        match answer {
            Some(Answer::Ok(response)) => Ok(response),
            Some(Answer::Fail(code)) => Err(ClientError::status(
                StatusCode::from_u16(code).expect("status code"),
                None,
            )),
            None => Ok(QueryResponse::default()),
        }
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.state.lock().expect("state").calls.push(Call::Health);
        Ok(HealthStatus {
            status: "healthy".into(),
            service: Some("DocuMind API".into()),
            version: Some("1.0.0".into()),
        })
    }
}

pub fn identity(id: Option<i64>, user_id: Option<i64>, username: &str) -> IdentityPayload {
    IdentityPayload {
        id,
        user_id,
        username: Some(username.to_string()),
        message: None,
    }
}

pub fn answer(text: &str) -> Answer {
    Answer::Ok(QueryResponse {
        answer: Some(text.to_string()),
    })
}
