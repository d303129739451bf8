//! The access/refresh token pair as carried by request cookies.

use axum::http::HeaderMap;

use super::cookie::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, get_non_empty_cookie};

/// Bearer tokens read from the request. Both are opaque at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn new(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self {
            access: access.filter(|t| !t.is_empty()).map(str::to_owned),
            refresh: refresh.filter(|t| !t.is_empty()).map(str::to_owned),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(
            get_non_empty_cookie(headers, ACCESS_COOKIE_NAME),
            get_non_empty_cookie(headers, REFRESH_COOKIE_NAME),
        )
    }

    pub fn has_access(&self) -> bool {
        self.access.is_some()
    }

    pub fn has_refresh(&self) -> bool {
        self.refresh.is_some()
    }

    /// Whether the client should exchange its refresh token after mounting.
    pub fn needs_refresh(&self) -> bool {
        check_token(self.access.as_deref(), self.refresh.as_deref())
    }
}

/// True only in the "access gone, refresh still held" state. Empty strings
/// count as absent.
pub fn check_token(access: Option<&str>, refresh: Option<&str>) -> bool {
    let present = |t: Option<&str>| t.is_some_and(|t| !t.is_empty());
    !present(access) && present(refresh)
}
