//! Authentication state shared by the screens

use api::{AccountRepository, UserProfile};
use appwrite::Document;
use tracing::{info, warn};

/// Authentication state for the application
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub loading: bool,
    pub is_logged: bool,
    pub user: Option<Document<UserProfile>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self {
            loading: true,
            is_logged: false,
            user: None,
        }
    }
}

impl AuthContext {
    /// Resolve the signed-in user
    ///
    /// A backend failure is logged and treated as signed out.
    pub async fn load(accounts: &AccountRepository) -> Self {
        let user = match accounts.get_current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("Could not resolve current user, continuing signed out: {}", e);
                None
            }
        };

        if let Some(profile) = &user {
            info!("Signed in as {}", profile.data.username);
        }

        Self {
            loading: false,
            is_logged: user.is_some(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use appwrite::memory::{MemoryBackend, Operation};
    use common::AppwriteConfig;

    fn accounts() -> (Arc<MemoryBackend>, AccountRepository) {
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
        let repository = AccountRepository::new(backend.clone(), config);
        (backend, repository)
    }

    #[test]
    fn test_starts_loading() {
        let context = AuthContext::default();
        assert!(context.loading);
        assert!(!context.is_logged);
    }

    #[tokio::test]
    async fn test_signed_in_user_is_logged() {
        let (_backend, accounts) = accounts();
        accounts
            .create_user("jane@example.com", "password123", "jane")
            .await
            .expect("Failed to create user");

        let context = AuthContext::load(&accounts).await;

        assert!(!context.loading);
        assert!(context.is_logged);
        assert_eq!(
            context.user.map(|user| user.data.username),
            Some("jane".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_session_is_logged_out() {
        let (_backend, accounts) = accounts();

        let context = AuthContext::load(&accounts).await;

        assert!(!context.loading);
        assert!(!context.is_logged);
        assert!(context.user.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_resolves_logged_out() {
        let (backend, accounts) = accounts();
        backend.fail_next(Operation::GetAccount, 500, "Server Error");

        let context = AuthContext::load(&accounts).await;

        assert!(!context.loading);
        assert!(!context.is_logged);
    }
}
