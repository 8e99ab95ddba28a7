//! Databases service: document create and list

use common::BackendResult;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    client::AppwriteClient,
    models::{RawDocument, RawDocumentList},
    query::Query,
};

/// Handle to the document endpoints
pub struct DatabaseService<'a> {
    client: &'a AppwriteClient,
}

impl<'a> DatabaseService<'a> {
    pub(crate) fn new(client: &'a AppwriteClient) -> Self {
        Self { client }
    }

    fn documents_path(database_id: &str, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            database_id, collection_id
        )
    }

    /// Create a document with the given id
    pub async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<RawDocument> {
        info!(
            "Creating document {} in collection {}",
            document_id, collection_id
        );

        let request = self
            .client
            .http()
            .post(self.client.url(&Self::documents_path(database_id, collection_id)))
            .json(&json!({
                "documentId": document_id,
                "data": data,
            }));

        self.client.send(request).await
    }

    /// List documents matching the queries
    pub async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<RawDocumentList> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_string()))
            .collect();

        let request = self
            .client
            .http()
            .get(self.client.url(&Self::documents_path(database_id, collection_id)))
            .query(&params);

        self.client.send(request).await
    }
}
