//! Account service: registration, sessions and the current account

use common::BackendResult;
use serde_json::json;
use tracing::info;

use crate::{
    client::AppwriteClient,
    models::{Account, Session},
};

/// Handle to the account endpoints
pub struct AccountService<'a> {
    client: &'a AppwriteClient,
}

impl<'a> AccountService<'a> {
    pub(crate) fn new(client: &'a AppwriteClient) -> Self {
        Self { client }
    }

    /// Register a new account
    pub async fn create(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account> {
        info!("Creating account for: {}", email);

        let request = self.client.http().post(self.client.url("/account")).json(&json!({
            "userId": user_id,
            "email": email,
            "password": password,
            "name": name,
        }));

        self.client.send(request).await
    }

    /// Sign in with email and password. The session cookie is kept by the
    /// client for subsequent requests.
    pub async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<Session> {
        info!("Creating email session for: {}", email);

        let request = self
            .client
            .http()
            .post(self.client.url("/account/sessions/email"))
            .json(&json!({
                "email": email,
                "password": password,
            }));

        self.client.send(request).await
    }

    /// Account owning the current session
    pub async fn get(&self) -> BackendResult<Account> {
        let request = self.client.http().get(self.client.url("/account"));
        self.client.send(request).await
    }

    /// Delete a session; `"current"` targets the session of this client
    pub async fn delete_session(&self, session_id: &str) -> BackendResult<()> {
        info!("Deleting session: {}", session_id);

        let request = self
            .client
            .http()
            .delete(self.client.url(&format!("/account/sessions/{}", session_id)));

        self.client.send_empty(request).await
    }
}
