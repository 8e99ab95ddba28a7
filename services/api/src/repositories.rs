//! Repositories wrapping backend calls

use std::sync::Arc;

use appwrite::{Account, Backend, Document, ID, Query, Session};
use common::AppwriteConfig;
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    models::UserProfile,
    validation::{validate_email, validate_password, validate_username},
};

pub mod media;
pub mod posts;

/// Account and profile operations
#[derive(Clone)]
pub struct AccountRepository {
    backend: Arc<dyn Backend>,
    config: Arc<AppwriteConfig>,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(backend: Arc<dyn Backend>, config: Arc<AppwriteConfig>) -> Self {
        Self { backend, config }
    }

    /// Register a user: create the account, sign in, then store the profile
    /// document pointing back at the account
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> ApiResult<Document<UserProfile>> {
        validate_email(email)
            .and_then(|_| validate_password(password))
            .and_then(|_| validate_username(username))
            .map_err(ApiError::Validation)?;

        self.register(email, password, username)
            .await
            .inspect_err(|e| error!("Failed to create user {}: {}", email, e))
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> ApiResult<Document<UserProfile>> {
        let account = self
            .backend
            .create_account(&ID::unique(), email, password, username)
            .await?;
        info!("Created account {} for {}", account.id, email);

        let avatar = self.backend.get_initials(username)?;

        self.signin(email, password).await?;

        let document = self
            .backend
            .create_document(
                &self.config.database_id,
                &self.config.user_collection_id,
                &ID::unique(),
                json!({
                    "accountId": account.id,
                    "email": email,
                    "username": username,
                    "avatar": avatar.as_str(),
                }),
            )
            .await?;

        Ok(document.decode()?)
    }

    /// Sign in with email and password
    pub async fn signin(&self, email: &str, password: &str) -> ApiResult<Session> {
        let session = self
            .backend
            .create_email_password_session(email, password)
            .await
            .inspect_err(|e| error!("Failed to sign in {}: {}", email, e))?;

        info!("Signed in {}", email);
        Ok(session)
    }

    /// Account owning the current session
    pub async fn get_account(&self) -> ApiResult<Account> {
        let account = self
            .backend
            .get_account()
            .await
            .inspect_err(|e| error!("Failed to get account: {}", e))?;
        Ok(account)
    }

    /// Profile of the signed-in user
    ///
    /// `Ok(None)` when nobody is signed in or the account has no profile
    /// document. Any other failure is returned.
    pub async fn get_current_user(&self) -> ApiResult<Option<Document<UserProfile>>> {
        let account = match self.backend.get_account().await {
            Ok(account) => account,
            Err(e) if e.is_unauthorized() => {
                info!("No active session");
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to get current user: {}", e);
                return Err(e.into());
            }
        };

        let profiles = self
            .backend
            .list_documents(
                &self.config.database_id,
                &self.config.user_collection_id,
                &[Query::equal("accountId", account.id.as_str())],
            )
            .await
            .and_then(|list| list.decode::<UserProfile>())
            .inspect_err(|e| error!("Failed to get current user: {}", e))?;

        Ok(profiles.documents.into_iter().next())
    }

    /// Delete the current session
    pub async fn signout(&self) -> ApiResult<()> {
        self.backend
            .delete_session("current")
            .await
            .inspect_err(|e| error!("Failed to sign out: {}", e))?;

        info!("Signed out");
        Ok(())
    }
}
