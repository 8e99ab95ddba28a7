//! Data-access layer for the Aora application
//!
//! Every operation validates its input, issues one or two backend calls and
//! reshapes the result. Operations are grouped by the records they touch:
//!
//! - [`AccountRepository`]: `create_user`, `signin`, `get_account`,
//!   `get_current_user`, `signout`
//! - [`StorageRepository`]: `upload_file`, `get_file_preview`, `upload_pair`
//! - [`PostRepository`]: `create_video_post`, `get_all_posts`,
//!   `get_user_posts`, `search_posts`, `get_latest_posts`
//!
//! Failures are logged where they happen and returned as [`ApiError`].

pub mod error;
pub mod models;
pub mod repositories;
pub mod state;
pub mod validation;

pub use error::{ApiError, ApiResult};
pub use models::{Creator, FileKind, UploadedFile, UserProfile, VideoPost, VideoPostForm};
pub use repositories::{AccountRepository, media::StorageRepository, posts::PostRepository};
pub use state::AppState;
