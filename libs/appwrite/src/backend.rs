//! Operations the data-access layer needs from the backend

use async_trait::async_trait;
use common::BackendResult;
use reqwest::Url;
use serde_json::Value;

use crate::{
    client::AppwriteClient,
    models::{Account, File, FileAsset, RawDocument, RawDocumentList, Session},
    query::Query,
    storage::PreviewOptions,
};

/// Backend seam between the data-access layer and a concrete client
///
/// URL builders are synchronous: they never touch the network.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account>;

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<Session>;

    async fn get_account(&self) -> BackendResult<Account>;

    async fn delete_session(&self, session_id: &str) -> BackendResult<()>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<RawDocument>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<RawDocumentList>;

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileAsset,
    ) -> BackendResult<File>;

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<()>;

    fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Url>;

    fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> BackendResult<Url>;

    fn get_initials(&self, name: &str) -> BackendResult<Url>;
}

#[async_trait]
impl Backend for AppwriteClient {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account> {
        self.account().create(user_id, email, password, name).await
    }

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<Session> {
        self.account()
            .create_email_password_session(email, password)
            .await
    }

    async fn get_account(&self) -> BackendResult<Account> {
        self.account().get().await
    }

    async fn delete_session(&self, session_id: &str) -> BackendResult<()> {
        self.account().delete_session(session_id).await
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<RawDocument> {
        self.databases()
            .create_document(database_id, collection_id, document_id, data)
            .await
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<RawDocumentList> {
        self.databases()
            .list_documents(database_id, collection_id, queries)
            .await
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileAsset,
    ) -> BackendResult<File> {
        self.storage().create_file(bucket_id, file_id, file).await
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<()> {
        self.storage().delete_file(bucket_id, file_id).await
    }

    fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Url> {
        self.storage().get_file_view(bucket_id, file_id)
    }

    fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> BackendResult<Url> {
        self.storage().get_file_preview(bucket_id, file_id, options)
    }

    fn get_initials(&self, name: &str) -> BackendResult<Url> {
        self.avatars().get_initials(name)
    }
}
