use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Document, DocumentId, UserId},
    error::ErrorBody,
    protocol::{Credentials, HealthStatus, IdentityPayload, MessageAck, QueryRequest, QueryResponse},
};
use tracing::{debug, info};

use crate::{upload::PendingFile, BackendHandle, ClientError};

/// reqwest-backed [`BackendHandle`] with a shared cookie store.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_checked(request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let detail = ErrorBody::from_bytes(&body)
            .and_then(|body| body.detail_text().map(str::to_owned));
        debug!(%status, detail = detail.as_deref(), "backend rejected request");
        Err(ClientError::status(status, detail))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl BackendHandle for HttpBackend {
    async fn current_user(&self) -> Result<IdentityPayload, ClientError> {
        let response = Self::send_checked(self.http.get(self.url("/auth/me"))).await?;
        Self::read_json(response).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<IdentityPayload, ClientError> {
        let response =
            Self::send_checked(self.http.post(self.url("/auth/login")).json(credentials)).await?;
        Self::read_json(response).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<IdentityPayload, ClientError> {
        let response =
            Self::send_checked(self.http.post(self.url("/auth/register")).json(credentials))
                .await?;
        Self::read_json(response).await
    }

    async fn logout(&self) -> Result<MessageAck, ClientError> {
        let response = Self::send_checked(self.http.post(self.url("/auth/logout"))).await?;
        Self::read_json(response).await
    }

    async fn list_documents(&self, user_id: UserId) -> Result<Vec<Document>, ClientError> {
        let response =
            Self::send_checked(self.http.get(self.url(&format!("/documents/list/{user_id}"))))
                .await?;
        Self::read_json(response).await
    }

    async fn delete_document(&self, document_id: DocumentId) -> Result<(), ClientError> {
        Self::send_checked(self.http.delete(self.url(&format!("/documents/{document_id}"))))
            .await?;
        Ok(())
    }

    async fn delete_all_documents(&self, user_id: UserId) -> Result<(), ClientError> {
        Self::send_checked(self.http.delete(self.url(&format!("/documents/all/{user_id}"))))
            .await?;
        Ok(())
    }

    async fn upload_document(
        &self,
        user_id: UserId,
        file: &PendingFile,
    ) -> Result<(), ClientError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(&file.mime_type())?;
        let form = Form::new()
            .part("file", part)
            .text("user_id", user_id.to_string());

        info!(
            user_id = user_id.0,
            file_name = file.name(),
            size_bytes = file.len(),
            "documents: uploading"
        );
        Self::send_checked(self.http.post(self.url("/documents/upload")).multipart(form)).await?;
        Ok(())
    }

    async fn ask(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let response =
            Self::send_checked(self.http.post(self.url("/documents/query")).json(request))
                .await?;
        Self::read_json(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = Self::send_checked(self.http.get(self.url("/health"))).await?;
        Self::read_json(response).await
    }
}
