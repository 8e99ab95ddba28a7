//! HTTP transport shared by every backend service handle

use std::sync::Arc;
use std::time::Duration;

use common::{AppwriteConfig, BackendError, BackendResult};
use reqwest::{
    RequestBuilder, Response, Url,
    header::{HeaderMap, HeaderName, HeaderValue, ORIGIN},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    account::AccountService, avatars::AvatarService, databases::DatabaseService,
    storage::StorageService,
};

/// Response format version the models in this crate are written against
pub const RESPONSE_FORMAT: &str = "1.5.0";

const PROJECT_HEADER: &str = "x-appwrite-project";
const RESPONSE_FORMAT_HEADER: &str = "x-appwrite-response-format";

/// Error body returned by the backend on non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
}

/// Client for the hosted backend
///
/// Cheap to clone. The session cookie issued at sign-in lives in the
/// client's cookie store and is shared by every clone.
#[derive(Clone)]
pub struct AppwriteClient {
    inner: Arc<ClientInner>,
}

impl AppwriteClient {
    /// Build a client from the backend configuration
    pub fn new(config: &AppwriteConfig) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(PROJECT_HEADER),
            header_value(&config.project_id)?,
        );
        headers.insert(
            HeaderName::from_static(RESPONSE_FORMAT_HEADER),
            HeaderValue::from_static(RESPONSE_FORMAT),
        );
        headers.insert(
            ORIGIN,
            header_value(&format!(
                "appwrite-{}://{}",
                std::env::consts::OS,
                config.platform
            ))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        info!("Backend client initialized for endpoint: {}", config.endpoint);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                project_id: config.project_id.clone(),
            }),
        })
    }

    /// Account service: registration, sessions, current account
    pub fn account(&self) -> AccountService<'_> {
        AccountService::new(self)
    }

    /// Databases service: documents
    pub fn databases(&self) -> DatabaseService<'_> {
        DatabaseService::new(self)
    }

    /// Storage service: files
    pub fn storage(&self) -> StorageService<'_> {
        StorageService::new(self)
    }

    /// Avatars service: generated images
    pub fn avatars(&self) -> AvatarService<'_> {
        AvatarService::new(self)
    }

    /// The endpoint every request path is appended to
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.endpoint, path)
    }

    /// URL for a resource fetched directly by the caller (image tags,
    /// players). The project id travels as a query parameter since no
    /// headers are attached to such requests.
    pub(crate) fn resource_url(&self, path: &str, params: &[(&str, String)]) -> BackendResult<Url> {
        resource_url(&self.inner.endpoint, &self.inner.project_id, path, params)
    }

    /// Send a request and decode its JSON body
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let response = check(request.send().await?).await?;
        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Send a request whose success response carries no body
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> BackendResult<()> {
        check(request.send().await?).await?;
        Ok(())
    }
}

fn header_value(value: &str) -> BackendResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| BackendError::Configuration(format!("Invalid header value {}: {}", value, e)))
}

pub(crate) fn resource_url(
    endpoint: &str,
    project_id: &str,
    path: &str,
    params: &[(&str, String)],
) -> BackendResult<Url> {
    let mut url = Url::parse(&format!("{}{}", endpoint.trim_end_matches('/'), path))
        .map_err(|e| BackendError::Configuration(format!("Invalid resource URL: {}", e)))?;

    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("project", project_id);
    }

    Ok(url)
}

/// Turn a non-success response into the matching error kind
async fn check(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(error) => error.message,
        Err(_) if body.is_empty() => status.canonical_reason().unwrap_or_default().to_string(),
        Err(_) => body,
    };

    debug!("Backend responded with {}: {}", status, message);
    Err(BackendError::from_status(status.as_u16(), message))
}
