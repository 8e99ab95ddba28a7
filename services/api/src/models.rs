//! Domain models stored in the backend's collections

use std::fmt;
use std::str::FromStr;

use appwrite::{Document, FileAsset, Url};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Profile document created once per registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Id of the owning account
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub email: String,
    pub username: String,
    /// Avatar image URL
    pub avatar: String,
}

/// Creator of a post
///
/// Written as the profile document id. Read back either as that id or, when
/// the backend expands the relationship, as the full profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Creator {
    Id(String),
    Profile(Box<Document<UserProfile>>),
}

impl Creator {
    /// Id of the creator's profile document
    pub fn id(&self) -> &str {
        match self {
            Creator::Id(id) => id,
            Creator::Profile(profile) => &profile.id,
        }
    }

    /// Expanded profile, if the backend returned one
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Creator::Id(_) => None,
            Creator::Profile(profile) => Some(&profile.data),
        }
    }
}

/// Video post document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPost {
    pub title: String,
    /// Thumbnail image URL
    pub thumbnail: String,
    /// Prompt the video was generated from
    pub prompt: String,
    /// Video URL
    pub video: String,
    pub creator: Creator,
}

/// Input of the create-post form
#[derive(Debug, Clone, Default)]
pub struct VideoPostForm {
    pub title: String,
    pub thumbnail: Option<FileAsset>,
    pub prompt: String,
    pub video: Option<FileAsset>,
    /// Profile document id of the author
    pub user_id: String,
}

/// How an uploaded file is served back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Served as a resized preview
    Image,
    /// Served as stored
    Video,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
        }
    }
}

impl FromStr for FileKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileKind::Image),
            "video" => Ok(FileKind::Video),
            other => Err(ApiError::InvalidFileType(other.to_string())),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File stored in the media bucket and the URL it is served from
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub id: String,
    pub url: Url,
}
