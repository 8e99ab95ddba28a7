//! Avatars service

use common::BackendResult;
use reqwest::Url;

use crate::client::AppwriteClient;

/// Handle to the avatar endpoints
pub struct AvatarService<'a> {
    client: &'a AppwriteClient,
}

impl<'a> AvatarService<'a> {
    pub(crate) fn new(client: &'a AppwriteClient) -> Self {
        Self { client }
    }

    /// URL of an image showing the initials of `name`. Built locally, the
    /// image is rendered by the backend when the URL is fetched.
    pub fn get_initials(&self, name: &str) -> BackendResult<Url> {
        self.client
            .resource_url("/avatars/initials", &[("name", name.to_string())])
    }
}
