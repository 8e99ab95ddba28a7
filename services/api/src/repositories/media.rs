//! Media repository: uploads to the storage bucket

use std::sync::Arc;

use appwrite::{Backend, FileAsset, ID, ImageGravity, PreviewOptions, Url};
use common::AppwriteConfig;
use tracing::{error, info, warn};

use crate::{
    error::ApiResult,
    models::{FileKind, UploadedFile},
};

/// Preview served for uploaded images
pub fn image_preview_options() -> PreviewOptions {
    PreviewOptions {
        width: Some(2000),
        height: Some(2000),
        gravity: Some(ImageGravity::Top),
        quality: Some(100),
    }
}

/// Media repository for storage operations
#[derive(Clone)]
pub struct StorageRepository {
    backend: Arc<dyn Backend>,
    config: Arc<AppwriteConfig>,
}

impl StorageRepository {
    /// Create a new storage repository
    pub fn new(backend: Arc<dyn Backend>, config: Arc<AppwriteConfig>) -> Self {
        Self { backend, config }
    }

    /// Upload a file and resolve the URL it is served from
    ///
    /// Returns `Ok(None)` when there is no file to upload.
    pub async fn upload_file(
        &self,
        file: Option<&FileAsset>,
        kind: FileKind,
    ) -> ApiResult<Option<UploadedFile>> {
        match file {
            Some(file) => self.upload(file, kind).await.map(Some),
            None => Ok(None),
        }
    }

    async fn upload(&self, file: &FileAsset, kind: FileKind) -> ApiResult<UploadedFile> {
        let stored = self
            .backend
            .create_file(&self.config.storage_id, &ID::unique(), file)
            .await
            .inspect_err(|e| error!("Failed to upload {} {}: {}", kind, file.name, e))?;

        match self.get_file_preview(&stored.id, kind) {
            Ok(url) => {
                info!("Uploaded {} {} as {}", kind, file.name, stored.id);
                Ok(UploadedFile { id: stored.id, url })
            }
            Err(e) => {
                self.discard(&stored.id).await;
                Err(e)
            }
        }
    }

    /// URL serving a stored file: the file itself for videos, a 2000x2000
    /// top-anchored preview at full quality for images
    pub fn get_file_preview(&self, file_id: &str, kind: FileKind) -> ApiResult<Url> {
        let url = match kind {
            FileKind::Video => self.backend.get_file_view(&self.config.storage_id, file_id),
            FileKind::Image => self.backend.get_file_preview(
                &self.config.storage_id,
                file_id,
                &image_preview_options(),
            ),
        }
        .inspect_err(|e| error!("Failed to get file preview for {}: {}", file_id, e))?;

        Ok(url)
    }

    /// Delete a stored file
    pub async fn delete_file(&self, file_id: &str) -> ApiResult<()> {
        self.backend
            .delete_file(&self.config.storage_id, file_id)
            .await
            .inspect_err(|e| error!("Failed to delete file {}: {}", file_id, e))?;
        Ok(())
    }

    /// Best-effort removal of a file orphaned by a failed operation
    pub(crate) async fn discard(&self, file_id: &str) {
        if let Err(e) = self.delete_file(file_id).await {
            warn!("Orphaned file {} could not be removed: {}", file_id, e);
        }
    }

    /// Upload a thumbnail and a video concurrently
    ///
    /// Both uploads run to completion. If either fails, the one that
    /// succeeded is deleted again and the first failure (thumbnail before
    /// video) is returned, so no file outlives a failed pair.
    pub async fn upload_pair(
        &self,
        thumbnail: &FileAsset,
        video: &FileAsset,
    ) -> ApiResult<(UploadedFile, UploadedFile)> {
        let (thumbnail, video) = tokio::join!(
            self.upload(thumbnail, FileKind::Image),
            self.upload(video, FileKind::Video)
        );

        match (thumbnail, video) {
            (Ok(thumbnail), Ok(video)) => Ok((thumbnail, video)),
            (Ok(uploaded), Err(e)) | (Err(e), Ok(uploaded)) => {
                self.discard(&uploaded.id).await;
                Err(e)
            }
            (Err(e), Err(_)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appwrite::memory::{Call, MemoryBackend, Operation};

    fn repository() -> (Arc<MemoryBackend>, StorageRepository) {
        let backend = Arc::new(MemoryBackend::new());
        let config = Arc::new(AppwriteConfig {
            endpoint: "http://localhost/v1".to_string(),
            platform: "com.jsm.aora".to_string(),
            project_id: "memory".to_string(),
            database_id: "db".to_string(),
            user_collection_id: "users".to_string(),
            video_collection_id: "videos".to_string(),
            storage_id: "media".to_string(),
            timeout_secs: 30,
        });
        let repository = StorageRepository::new(backend.clone(), config);
        (backend, repository)
    }

    async fn upload_as(
        repository: &StorageRepository,
        file: &FileAsset,
        kind: &str,
    ) -> ApiResult<Option<UploadedFile>> {
        let kind = kind.parse::<FileKind>()?;
        repository.upload_file(Some(file), kind).await
    }

    #[test]
    fn test_video_uses_view_url_only() {
        let (backend, repository) = repository();

        let url = repository
            .get_file_preview("f1", FileKind::Video)
            .expect("No view URL");

        assert!(url.path().ends_with("/files/f1/view"));
        assert_eq!(backend.count(Operation::GetFileView), 1);
        assert_eq!(backend.count(Operation::GetFilePreview), 0);
    }

    #[test]
    fn test_image_uses_fixed_preview_only() {
        let (backend, repository) = repository();

        repository
            .get_file_preview("f1", FileKind::Image)
            .expect("No preview URL");

        assert_eq!(backend.count(Operation::GetFileView), 0);
        assert_eq!(
            backend.calls(),
            vec![Call::GetFilePreview {
                file_id: "f1".to_string(),
                options: PreviewOptions {
                    width: Some(2000),
                    height: Some(2000),
                    gravity: Some(ImageGravity::Top),
                    quality: Some(100),
                },
            }]
        );
    }

    #[tokio::test]
    async fn test_absent_file_uploads_nothing() {
        let (backend, repository) = repository();

        let uploaded = repository
            .upload_file(None, FileKind::Image)
            .await
            .expect("Absent file is not an error");

        assert!(uploaded.is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_type_issues_no_storage_calls() {
        let (backend, repository) = repository();
        let file = FileAsset::new("thumb.gif", "image/gif", vec![1, 2, 3]);

        let result = upload_as(&repository, &file, "gif").await;

        assert!(matches!(
            result,
            Err(crate::error::ApiError::InvalidFileType(kind)) if kind == "gif"
        ));
        assert!(backend.calls().is_empty());

        upload_as(&repository, &file, "image")
            .await
            .expect("Failed to upload image");
        assert_eq!(backend.count(Operation::CreateFile), 1);
    }

    #[tokio::test]
    async fn test_upload_returns_served_url() {
        let (backend, repository) = repository();
        let file = FileAsset::new("clip.mp4", "video/mp4", vec![0; 32]);

        let uploaded = repository
            .upload_file(Some(&file), FileKind::Video)
            .await
            .expect("Failed to upload")
            .expect("No upload result");

        assert!(uploaded.url.path().ends_with(&format!("/files/{}/view", uploaded.id)));
        assert_eq!(backend.files("media").len(), 1);
    }

    #[tokio::test]
    async fn test_failed_url_removes_upload() {
        let (backend, repository) = repository();
        backend.fail_next(Operation::GetFilePreview, 500, "boom");
        let file = FileAsset::new("thumb.png", "image/png", vec![1, 2, 3]);

        assert!(repository.upload_file(Some(&file), FileKind::Image).await.is_err());
        assert_eq!(backend.count(Operation::DeleteFile), 1);
        assert!(backend.files("media").is_empty());
    }
}
