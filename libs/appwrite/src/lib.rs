//! Client for the hosted Appwrite backend
//!
//! [`AppwriteClient`] speaks the backend's REST protocol and exposes one
//! handle per backend service:
//!
//! - [`AppwriteClient::account`]: registration, sessions, current account
//! - [`AppwriteClient::databases`]: document create and list
//! - [`AppwriteClient::storage`]: file upload, deletion and URL building
//! - [`AppwriteClient::avatars`]: generated avatar URLs
//!
//! Callers that only need the operations should depend on the [`Backend`]
//! trait, which the in-memory backend (feature `memory`) implements too.
//!
//! ```rust,no_run
//! use appwrite::{AppwriteClient, Backend, Query};
//! use common::AppwriteConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppwriteConfig::from_env()?;
//!     let client = AppwriteClient::new(&config)?;
//!     let posts = client
//!         .list_documents(
//!             &config.database_id,
//!             &config.video_collection_id,
//!             &[Query::order_desc("$createdAt"), Query::limit(7)],
//!         )
//!         .await?;
//!     println!("{} posts", posts.total);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod avatars;
pub mod backend;
pub mod client;
pub mod databases;
pub mod id;
#[cfg(feature = "memory")]
pub mod memory;
pub mod models;
pub mod query;
pub mod storage;

pub use backend::Backend;
pub use client::AppwriteClient;
pub use id::ID;
pub use models::{
    Account, Document, DocumentList, File, FileAsset, RawDocument, RawDocumentList, Session,
};
pub use query::Query;
pub use reqwest::Url;
pub use storage::{ImageGravity, PreviewOptions};
