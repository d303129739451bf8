//! HTTP client for the remote marketplace API.
//!
//! No timeouts and no retries: a hung backend stalls the caller.

use reqwest::cookie::Jar;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::identity::{CartItem, EnrolledCourse, Identity};

/// Endpoint paths, relative to the configured base URL.
pub const REFRESH_PATH: [&str; 3] = ["api", "auth", "refresh"];
pub const CART_PATH: [&str; 2] = ["api", "cart"];
pub const ENROLLED_COURSES_PATH: [&str; 3] = ["api", "courses", "enrolled"];

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub status: u16,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
}

#[derive(Debug)]
pub enum BackendError {
    /// Transport failure or malformed URL
    Request(String),
    /// Non-success HTTP status
    Status(u16),
    /// Response body did not match the expected shape
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Request(e) => write!(f, "Backend request failed: {}", e),
            BackendError::Status(s) => write!(f, "Backend returned status {}", s),
            BackendError::Decode(e) => write!(f, "Failed to decode backend response: {}", e),
        }
    }
}

impl std::error::Error for BackendError {}

/// Client for the backend API. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    base_url: Url,
    http: reqwest::Client,
}

impl BackendClient {
    /// Cookie-less client, safe to share between requests of different users.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Client that sends and stores cookies through `jar`, the way a browser
    /// tab includes credentials on cross-origin calls.
    pub fn with_cookie_jar(base_url: Url, jar: Arc<Jar>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping any path prefix it has.
    /// Each segment is percent-encoded.
    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Request(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Exchange the refresh cookie for a new access token. The refresh token
    /// travels as a cookie from the client's jar.
    /// The `status` field of the body is returned as-is; callers decide.
    pub async fn refresh(&self) -> Result<RefreshResponse, BackendError> {
        let response = self
            .http
            .post(self.endpoint(REFRESH_PATH)?)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        response
            .json::<RefreshResponse>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    pub async fn cart(&self, user_id: &str) -> Result<Vec<CartItem>, BackendError> {
        let url = self.endpoint(CART_PATH.into_iter().chain([user_id]))?;
        self.get_json(url).await
    }

    pub async fn enrolled_courses(&self, user_id: &str) -> Result<Vec<EnrolledCourse>, BackendError> {
        let url = self.endpoint(ENROLLED_COURSES_PATH.into_iter().chain([user_id]))?;
        self.get_json(url).await
    }
}
