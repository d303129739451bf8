//! Calls back into this server's own `/api` routes.

use reqwest::cookie::Jar;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::backend::BackendError;
use crate::bootstrap::{Hydration, extract_hydration};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenBody<'a> {
    access_token: &'a str,
}

/// Same-origin client. Holds the site's own base URL and the tab's cookie
/// jar, so cookies set by `/api` routes apply to later page loads.
#[derive(Clone)]
pub struct SiteClient {
    base_url: Url,
    http: reqwest::Client,
}

impl SiteClient {
    pub fn new(base_url: Url, jar: Arc<Jar>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Request(e.to_string()))
    }

    fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::Status(response.status().as_u16()))
        }
    }

    /// Load a page and read the session it was rendered with.
    pub async fn load_session(&self, path: &str) -> Result<Hydration, BackendError> {
        let response = self
            .http
            .get(self.url(path)?)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let html = Self::expect_success(response)?
            .text()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        extract_hydration(&html)
            .ok_or_else(|| BackendError::Decode("page has no session payload".into()))
    }

    /// Hand a new access token to the server so it can set the httpOnly cookie.
    pub async fn store_access_token(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.url("/api/refresh")?)
            .json(&AccessTokenBody { access_token })
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::expect_success(response).map(drop)
    }

    pub async fn logout(&self) -> Result<(), BackendError> {
        let response = self
            .http
            .get(self.url("/api/logout")?)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::expect_success(response).map(drop)
    }
}
