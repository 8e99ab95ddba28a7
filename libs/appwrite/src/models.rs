//! Wire models returned by the backend

use std::path::Path;

use chrono::{DateTime, Utc};
use common::{BackendError, BackendResult};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Authenticated user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: bool,
    #[serde(default, rename = "emailVerification")]
    pub email_verification: bool,
}

/// Session issued at sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub expire: DateTime<Utc>,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub current: bool,
}

/// Stored document: backend metadata plus the typed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$collectionId")]
    pub collection_id: String,
    #[serde(rename = "$databaseId")]
    pub database_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Document with an untyped payload, as the backend returns it
pub type RawDocument = Document<Map<String, Value>>;

impl RawDocument {
    /// Decode the payload into a typed model
    pub fn decode<T: DeserializeOwned>(self) -> BackendResult<Document<T>> {
        let data = serde_json::from_value(Value::Object(self.data)).map_err(|e| {
            BackendError::Decode(format!("Document {} has an unexpected shape: {}", self.id, e))
        })?;

        Ok(Document {
            id: self.id,
            collection_id: self.collection_id,
            database_id: self.database_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            permissions: self.permissions,
            data,
        })
    }
}

/// One page of documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentList<T> {
    /// Number of documents matching the filters, ignoring limit and offset
    pub total: u64,
    pub documents: Vec<Document<T>>,
}

pub type RawDocumentList = DocumentList<Map<String, Value>>;

impl RawDocumentList {
    pub fn decode<T: DeserializeOwned>(self) -> BackendResult<DocumentList<T>> {
        let documents = self
            .documents
            .into_iter()
            .map(RawDocument::decode)
            .collect::<BackendResult<Vec<_>>>()?;

        Ok(DocumentList {
            total: self.total,
            documents,
        })
    }
}

/// File stored in a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId")]
    pub bucket_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal")]
    pub size_original: u64,
    #[serde(default, rename = "chunksTotal")]
    pub chunks_total: u64,
    #[serde(default, rename = "chunksUploaded")]
    pub chunks_uploaded: u64,
}

/// File picked on the device, ready to upload
#[derive(Clone, PartialEq)]
pub struct FileAsset {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileAsset {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>, mime_type: impl Into<String>) -> BackendResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| BackendError::Validation(format!("{} has no file name", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            BackendError::Validation(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for FileAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAsset")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
