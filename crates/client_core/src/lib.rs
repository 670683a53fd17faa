//! Client core for the DocuMind backend: the HTTP handle and the controllers
//! that own session, document, upload and conversation state.

use async_trait::async_trait;
use shared::{
    domain::{Document, DocumentId, UserId},
    protocol::{Credentials, HealthStatus, IdentityPayload, MessageAck, QueryRequest, QueryResponse},
};

pub mod conversation;
pub mod error;
pub mod notice;
pub mod registry;
pub mod session;
pub mod transport;
pub mod upload;

pub use conversation::{ConversationController, PendingQuestion, SubmitRejection};
pub use error::ClientError;
pub use notice::{Notice, NoticeKind};
pub use registry::{refresh_signal, DeleteAllOutcome, DocumentRegistry, RefreshTrigger};
pub use session::{AuthFailure, CheckOutcome, Registration, SessionController};
pub use transport::HttpBackend;
pub use upload::{PendingFile, UploadCoordinator, UploadOutcome, ACCEPTED_EXTENSIONS};

/// Operations exposed by the remote DocuMind service.
///
/// Every call is credentialed; implementations share one cookie store across
/// calls so the session established by `login` is reused.
#[async_trait]
pub trait BackendHandle: Send + Sync {
    async fn current_user(&self) -> Result<IdentityPayload, ClientError>;
    async fn login(&self, credentials: &Credentials) -> Result<IdentityPayload, ClientError>;
    async fn register(&self, credentials: &Credentials) -> Result<IdentityPayload, ClientError>;
    async fn logout(&self) -> Result<MessageAck, ClientError>;
    async fn list_documents(&self, user_id: UserId) -> Result<Vec<Document>, ClientError>;
    async fn delete_document(&self, document_id: DocumentId) -> Result<(), ClientError>;
    async fn delete_all_documents(&self, user_id: UserId) -> Result<(), ClientError>;
    async fn upload_document(&self, user_id: UserId, file: &PendingFile)
        -> Result<(), ClientError>;
    async fn ask(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;
    async fn health(&self) -> Result<HealthStatus, ClientError>;
}

#[cfg(any(test, feature = "testing"))]
pub mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
