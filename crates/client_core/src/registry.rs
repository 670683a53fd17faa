use std::{future::Future, sync::Arc};

use shared::domain::{Document, DocumentId, UserId};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{notice::Notice, BackendHandle};

const LIST_FAILED: &str = "Failed to load documents";
const DELETE_FAILED: &str = "Delete failed";
const CLEAR_FAILED: &str = "Failed to clear documents";
pub const CLEAR_ALL_PROMPT: &str = "Delete ALL uploaded documents? This cannot be undone.";

/// Increments the refresh counter observed by a [`DocumentRegistry`].
#[derive(Clone)]
pub struct RefreshTrigger {
    tx: watch::Sender<u64>,
}

impl RefreshTrigger {
    pub fn bump(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

pub fn refresh_signal() -> (RefreshTrigger, watch::Receiver<u64>) {
    let (tx, rx) = watch::channel(0);
    (RefreshTrigger { tx }, rx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAllOutcome {
    Declined,
    Cleared,
}

/// Read-only cached copy of the user's documents.
pub struct DocumentRegistry {
    backend: Arc<dyn BackendHandle>,
    user_id: UserId,
    documents: Vec<Document>,
    loading: bool,
    refresh: watch::Receiver<u64>,
    synced: Option<(UserId, u64)>,
}

impl DocumentRegistry {
    pub fn new(
        backend: Arc<dyn BackendHandle>,
        user_id: UserId,
        refresh: watch::Receiver<u64>,
    ) -> Self {
        Self {
            backend,
            user_id,
            documents: Vec::new(),
            loading: true,
            refresh,
            synced: None,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_clear_all(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn set_user(&mut self, user_id: UserId) {
        self.user_id = user_id;
    }

    /// Re-lists when the user or the refresh counter changed since the last
    /// sync. Returns whether a list request was issued.
    pub async fn sync(&mut self) -> Result<bool, Notice> {
        let generation = *self.refresh.borrow_and_update();
        let key = (self.user_id, generation);
        if self.synced == Some(key) {
            return Ok(false);
        }
        self.synced = Some(key);
        self.list().await.map(|()| true)
    }

    /// Replaces the cached set with the server's. The cache is untouched on
    /// failure.
    pub async fn list(&mut self) -> Result<(), Notice> {
        let result = self.backend.list_documents(self.user_id).await;
        self.loading = false;
        match result {
            Ok(documents) => {
                info!(
                    user_id = self.user_id.0,
                    count = documents.len(),
                    "documents: listed"
                );
                self.documents = documents;
                Ok(())
            }
            Err(err) => {
                warn!(user_id = self.user_id.0, error = %err, "documents: list failed");
                Err(Notice::error(LIST_FAILED))
            }
        }
    }

    pub async fn delete(&mut self, document_id: DocumentId) -> Result<(), Notice> {
        if let Err(err) = self.backend.delete_document(document_id).await {
            warn!(document_id = document_id.0, error = %err, "documents: delete failed");
            return Err(Notice::error(DELETE_FAILED));
        }
        info!(document_id = document_id.0, "documents: deleted");
        self.list().await
    }

    /// Asks `confirm` with [`CLEAR_ALL_PROMPT`] and only issues the request
    /// when it answers yes.
    pub async fn delete_all<F, Fut>(&mut self, confirm: F) -> Result<DeleteAllOutcome, Notice>
    where
        F: FnOnce(&'static str) -> Fut,
        Fut: Future<Output = bool>,
    {
        if !confirm(CLEAR_ALL_PROMPT).await {
            return Ok(DeleteAllOutcome::Declined);
        }
        if let Err(err) = self.backend.delete_all_documents(self.user_id).await {
            warn!(user_id = self.user_id.0, error = %err, "documents: clear failed");
            return Err(Notice::error(CLEAR_FAILED));
        }
        info!(user_id = self.user_id.0, "documents: cleared");
        self.list().await?;
        Ok(DeleteAllOutcome::Cleared)
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
