//! Backend connection configuration
//!
//! The configuration is read once at startup, either from `APPWRITE_*`
//! environment variables or from an explicit key/value map, and then handed
//! to the client. It is never reloaded at runtime.

use config::{Config, Environment, Map};
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::error::{BackendError, BackendResult};

/// Prefix shared by every configuration variable
pub const ENV_PREFIX: &str = "APPWRITE";

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings and resource ids for the hosted backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppwriteConfig {
    /// API endpoint, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    /// Platform identifier registered for the project
    pub platform: String,
    pub project_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub video_collection_id: String,
    /// Storage bucket holding thumbnails and videos
    pub storage_id: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AppwriteConfig {
    /// Load the configuration from environment variables
    ///
    /// # Environment Variables
    /// - `APPWRITE_ENDPOINT`
    /// - `APPWRITE_PLATFORM`
    /// - `APPWRITE_PROJECT_ID`
    /// - `APPWRITE_DATABASE_ID`
    /// - `APPWRITE_USER_COLLECTION_ID`
    /// - `APPWRITE_VIDEO_COLLECTION_ID`
    /// - `APPWRITE_STORAGE_ID`
    /// - `APPWRITE_TIMEOUT_SECS` (optional, default: 30)
    pub fn from_env() -> BackendResult<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load the configuration from a map keyed like the environment variables
    pub fn from_map(vars: Map<String, String>) -> BackendResult<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(source: Environment) -> BackendResult<Self> {
        let settings = Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| BackendError::Configuration(e.to_string()))?;

        let mut config: AppwriteConfig = settings
            .try_deserialize()
            .map_err(|e| BackendError::Configuration(e.to_string()))?;

        config.endpoint = config.endpoint.trim_end_matches('/').to_string();
        config.validate()?;

        info!(
            "Loaded backend configuration for project {} at {}",
            config.project_id, config.endpoint
        );
        Ok(config)
    }

    fn validate(&self) -> BackendResult<()> {
        Url::parse(&self.endpoint).map_err(|e| {
            BackendError::Configuration(format!("Invalid endpoint {}: {}", self.endpoint, e))
        })?;

        let ids = [
            ("platform", &self.platform),
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("user_collection_id", &self.user_collection_id),
            ("video_collection_id", &self.video_collection_id),
            ("storage_id", &self.storage_id),
        ];
        for (name, value) in ids {
            if value.trim().is_empty() {
                return Err(BackendError::Configuration(format!(
                    "{}_{} must not be empty",
                    ENV_PREFIX,
                    name.to_uppercase()
                )));
            }
        }

        Ok(())
    }
}
