use std::{path::Path, sync::Arc};

use anyhow::{anyhow, Context, Result};
use shared::domain::UserId;
use tracing::{info, warn};

use crate::{notice::Notice, registry::RefreshTrigger, BackendHandle};

/// Extensions offered by the file picker. Advisory only: the backend decides
/// what it can ingest.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "xlsx", "xls", "csv"];

const UPLOAD_SUCCEEDED: &str = "Upload successful!";
const UPLOAD_FAILED: &str = "Upload failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    name: String,
    bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("'{}' does not name a file", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing pending, or an upload is already running.
    Skipped,
    Uploaded(Notice),
    Failed(Notice),
}

impl UploadOutcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            UploadOutcome::Skipped => None,
            UploadOutcome::Uploaded(notice) | UploadOutcome::Failed(notice) => Some(notice),
        }
    }
}

/// Owns the single pending file and its upload lifecycle.
pub struct UploadCoordinator {
    backend: Arc<dyn BackendHandle>,
    user_id: UserId,
    pending: Option<PendingFile>,
    uploading: bool,
    on_uploaded: RefreshTrigger,
}

impl UploadCoordinator {
    pub fn new(
        backend: Arc<dyn BackendHandle>,
        user_id: UserId,
        on_uploaded: RefreshTrigger,
    ) -> Self {
        Self {
            backend,
            user_id,
            pending: None,
            uploading: false,
            on_uploaded,
        }
    }

    /// Replaces any prior selection. Returns whether the file matches the
    /// advisory extension allow-list.
    pub fn select(&mut self, file: PendingFile) -> bool {
        let accepted = file.has_accepted_extension();
        if !accepted {
            warn!(
                file_name = file.name(),
                "upload: selected file is outside the advertised formats"
            );
        }
        self.pending = Some(file);
        accepted
    }

    pub fn remove(&mut self) -> Option<PendingFile> {
        if self.uploading {
            return None;
        }
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingFile> {
        self.pending.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn can_upload(&self) -> bool {
        self.pending.is_some() && !self.uploading
    }

    pub async fn upload(&mut self) -> UploadOutcome {
        if !self.can_upload() {
            return UploadOutcome::Skipped;
        }
        let Some(file) = self.pending.clone() else {
            return UploadOutcome::Skipped;
        };

        self.uploading = true;
        let result = self.backend.upload_document(self.user_id, &file).await;
        self.uploading = false;

        match result {
            Ok(()) => {
                info!(
                    user_id = self.user_id.0,
                    file_name = file.name(),
                    "upload: completed"
                );
                self.pending = None;
                self.on_uploaded.bump();
                UploadOutcome::Uploaded(Notice::success(UPLOAD_SUCCEEDED))
            }
            Err(err) => {
                warn!(
                    user_id = self.user_id.0,
                    file_name = file.name(),
                    error = %err,
                    "upload: failed; keeping file selected for retry"
                );
                UploadOutcome::Failed(Notice::error(UPLOAD_FAILED))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
