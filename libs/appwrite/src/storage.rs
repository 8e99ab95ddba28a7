//! Storage service: file upload, deletion and URL building

use common::{BackendError, BackendResult};
use reqwest::{
    Url,
    header::CONTENT_RANGE,
    multipart::{Form, Part},
};
use tracing::info;

use crate::{
    client::AppwriteClient,
    models::{File, FileAsset},
};

/// Files larger than this are uploaded in consecutive chunks
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

const UPLOAD_ID_HEADER: &str = "x-appwrite-id";

/// Crop anchor for image previews
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageGravity {
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ImageGravity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageGravity::Center => "center",
            ImageGravity::TopLeft => "top-left",
            ImageGravity::Top => "top",
            ImageGravity::TopRight => "top-right",
            ImageGravity::Left => "left",
            ImageGravity::Right => "right",
            ImageGravity::BottomLeft => "bottom-left",
            ImageGravity::Bottom => "bottom",
            ImageGravity::BottomRight => "bottom-right",
        }
    }
}

/// Transformations applied by the preview endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub gravity: Option<ImageGravity>,
    /// 0 to 100
    pub quality: Option<u8>,
}

impl PreviewOptions {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(width) = self.width {
            params.push(("width", width.to_string()));
        }
        if let Some(height) = self.height {
            params.push(("height", height.to_string()));
        }
        if let Some(gravity) = self.gravity {
            params.push(("gravity", gravity.as_str().to_string()));
        }
        if let Some(quality) = self.quality {
            params.push(("quality", quality.to_string()));
        }
        params
    }
}

pub(crate) fn file_path(bucket_id: &str, file_id: &str) -> String {
    format!("/storage/buckets/{}/files/{}", bucket_id, file_id)
}

/// Handle to the storage endpoints
pub struct StorageService<'a> {
    client: &'a AppwriteClient,
}

impl<'a> StorageService<'a> {
    pub(crate) fn new(client: &'a AppwriteClient) -> Self {
        Self { client }
    }

    /// Upload a file into a bucket
    pub async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileAsset,
    ) -> BackendResult<File> {
        let url = self
            .client
            .url(&format!("/storage/buckets/{}/files", bucket_id));
        let total = file.size();

        info!(
            "Uploading {} ({} bytes) to bucket {}",
            file.name, total, bucket_id
        );

        if total <= CHUNK_SIZE {
            let form = upload_form(file_id, file, &file.bytes)?;
            let request = self.client.http().post(&url).multipart(form);
            return self.client.send(request).await;
        }

        let mut uploaded: Option<File> = None;
        let mut start = 0;
        while start < total {
            let end = (start + CHUNK_SIZE).min(total);
            let form = upload_form(file_id, file, &file.bytes[start..end])?;

            let mut request = self
                .client
                .http()
                .post(&url)
                .header(CONTENT_RANGE, format!("bytes {}-{}/{}", start, end - 1, total))
                .multipart(form);
            if let Some(previous) = &uploaded {
                request = request.header(UPLOAD_ID_HEADER, previous.id.as_str());
            }

            let chunk: File = self.client.send(request).await?;
            info!(
                "Uploaded chunk {}/{} of {}",
                chunk.chunks_uploaded, chunk.chunks_total, file.name
            );
            uploaded = Some(chunk);
            start = end;
        }

        uploaded.ok_or_else(|| BackendError::Decode(format!("No chunk uploaded for {}", file.name)))
    }

    /// Delete a file from a bucket
    pub async fn delete_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<()> {
        info!("Deleting file {} from bucket {}", file_id, bucket_id);

        let request = self
            .client
            .http()
            .delete(self.client.url(&file_path(bucket_id, file_id)));

        self.client.send_empty(request).await
    }

    /// URL serving the file as stored
    pub fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Url> {
        self.client
            .resource_url(&format!("{}/view", file_path(bucket_id, file_id)), &[])
    }

    /// URL serving a resized and cropped image of the file
    pub fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> BackendResult<Url> {
        self.client.resource_url(
            &format!("{}/preview", file_path(bucket_id, file_id)),
            &options.to_params(),
        )
    }
}

fn upload_form(file_id: &str, file: &FileAsset, bytes: &[u8]) -> BackendResult<Form> {
    let part = Part::bytes(bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| BackendError::Validation(format!("Invalid MIME type {}: {}", file.mime_type, e)))?;

    Ok(Form::new()
        .text("fileId", file_id.to_string())
        .part("file", part))
}
