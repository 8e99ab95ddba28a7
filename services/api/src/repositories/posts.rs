//! Post repository: video post documents

use std::sync::Arc;

use appwrite::{Backend, Document, ID, Query};
use common::AppwriteConfig;
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    models::{VideoPost, VideoPostForm},
    repositories::media::StorageRepository,
    validation::validate_required,
};

/// Number of posts shown in the "latest" strip
pub const LATEST_POSTS_LIMIT: u32 = 7;

const CREATED_AT: &str = "$createdAt";

/// Post repository for document operations
#[derive(Clone)]
pub struct PostRepository {
    backend: Arc<dyn Backend>,
    config: Arc<AppwriteConfig>,
    storage: StorageRepository,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(
        backend: Arc<dyn Backend>,
        config: Arc<AppwriteConfig>,
        storage: StorageRepository,
    ) -> Self {
        Self {
            backend,
            config,
            storage,
        }
    }

    /// Upload the form's thumbnail and video, then store the post
    ///
    /// The post is only created once both uploads succeeded. Uploaded files
    /// are removed again when the post cannot be stored.
    pub async fn create_video_post(&self, form: &VideoPostForm) -> ApiResult<Document<VideoPost>> {
        validate_required("Title", &form.title)
            .and_then(|_| validate_required("Prompt", &form.prompt))
            .and_then(|_| validate_required("Creator", &form.user_id))
            .map_err(ApiError::Validation)?;
        let (Some(thumbnail), Some(video)) = (&form.thumbnail, &form.video) else {
            return Err(ApiError::Validation(
                "Thumbnail and video are required".to_string(),
            ));
        };

        let (thumbnail, video) = self
            .storage
            .upload_pair(thumbnail, video)
            .await
            .inspect_err(|e| error!("Failed to create video post: {}", e))?;

        let created = self
            .backend
            .create_document(
                &self.config.database_id,
                &self.config.video_collection_id,
                &ID::unique(),
                json!({
                    "title": form.title,
                    "thumbnail": thumbnail.url.as_str(),
                    "prompt": form.prompt,
                    "video": video.url.as_str(),
                    "creator": form.user_id,
                }),
            )
            .await
            .and_then(|document| document.decode::<VideoPost>());

        match created {
            Ok(post) => {
                info!("Created video post {}", post.id);
                Ok(post)
            }
            Err(e) => {
                error!("Failed to create video post: {}", e);
                self.storage.discard(&thumbnail.id).await;
                self.storage.discard(&video.id).await;
                Err(e.into())
            }
        }
    }

    async fn list(&self, queries: &[Query]) -> ApiResult<Vec<Document<VideoPost>>> {
        let posts = self
            .backend
            .list_documents(
                &self.config.database_id,
                &self.config.video_collection_id,
                queries,
            )
            .await?
            .decode::<VideoPost>()?;

        Ok(posts.documents)
    }

    /// Every post, newest first
    pub async fn get_all_posts(&self) -> ApiResult<Vec<Document<VideoPost>>> {
        self.list(&[Query::order_desc(CREATED_AT)])
            .await
            .inspect_err(|e| error!("Failed to get all posts: {}", e))
    }

    /// Posts by one creator, newest first
    pub async fn get_user_posts(&self, user_id: &str) -> ApiResult<Vec<Document<VideoPost>>> {
        self.list(&[Query::equal("creator", user_id), Query::order_desc(CREATED_AT)])
            .await
            .inspect_err(|e| error!("Failed to get posts of {}: {}", user_id, e))
    }

    /// Posts whose title matches the query, using the backend's full-text
    /// search on `title`
    pub async fn search_posts(&self, query: &str) -> ApiResult<Vec<Document<VideoPost>>> {
        let query = query.trim();
        validate_required("Search query", query).map_err(ApiError::Validation)?;

        self.list(&[Query::search("title", query)])
            .await
            .inspect_err(|e| error!("Failed to search posts for {:?}: {}", query, e))
    }

    /// The most recent posts, newest first
    pub async fn get_latest_posts(&self) -> ApiResult<Vec<Document<VideoPost>>> {
        self.list(&[
            Query::order_desc(CREATED_AT),
            Query::limit(LATEST_POSTS_LIMIT),
        ])
        .await
        .inspect_err(|e| error!("Failed to get latest posts: {}", e))
    }
}
