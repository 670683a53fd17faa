//! Authenticated subtree: wires the upload coordinator to the registry's
//! refresh counter and owns the chat transcript.

use std::sync::Arc;

use client_core::{
    refresh_signal, BackendHandle, ConversationController, DocumentRegistry, UploadCoordinator,
};
use shared::domain::Identity;

pub struct Dashboard {
    identity: Identity,
    pub registry: DocumentRegistry,
    pub uploads: UploadCoordinator,
    pub conversation: ConversationController,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn BackendHandle>, identity: Identity) -> Self {
        let user_id = identity.user_id();
        let (trigger, refresh) = refresh_signal();
        Self {
            registry: DocumentRegistry::new(backend.clone(), user_id, refresh),
            uploads: UploadCoordinator::new(backend.clone(), user_id, trigger),
            conversation: ConversationController::new(backend, user_id),
            identity,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
