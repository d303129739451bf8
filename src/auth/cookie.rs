//! Cookie names, parsing and `Set-Cookie` builders.

use axum::http::{HeaderMap, header};

use crate::theme::Theme;

/// Cookie name for the access token (short-lived, 2 hours).
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie name for the refresh token (long-lived, 30 days).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Cookie name for the theme preference.
pub const THEME_COOKIE_NAME: &str = "theme";

/// Access token cookie lifetime: 2 hours
pub const ACCESS_COOKIE_MAX_AGE: u64 = 2 * 60 * 60;

/// Refresh token cookie lifetime: 30 days
pub const REFRESH_COOKIE_MAX_AGE: u64 = 30 * 24 * 60 * 60;

/// Theme cookie lifetime: 1 year
pub const THEME_COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Same as [`get_cookie`] but treats an empty value as absent.
pub fn get_non_empty_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    get_cookie(headers, name).filter(|v| !v.is_empty())
}

/// Whether `token` only uses JWT/base64 characters and so cannot break out
/// of a `Set-Cookie` value.
pub fn is_cookie_safe_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"._~+/=-".contains(&b))
}

/// Access token cookie as set on login (cross-site capable).
pub fn access_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={}",
        ACCESS_COOKIE_NAME, token, ACCESS_COOKIE_MAX_AGE
    )
}

/// Access token cookie as set by the same-origin refresh handoff.
pub fn refreshed_access_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        ACCESS_COOKIE_NAME, token, ACCESS_COOKIE_MAX_AGE
    )
}

pub fn refresh_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={}",
        REFRESH_COOKIE_NAME, token, REFRESH_COOKIE_MAX_AGE
    )
}

/// Theme cookie, readable by scripts.
pub fn theme_cookie(theme: Theme) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}",
        THEME_COOKIE_NAME, theme, THEME_COOKIE_MAX_AGE
    )
}

/// Expire a token cookie. Flags must match the ones used when setting it.
pub fn clear_token_cookie(name: &str) -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=None; Path=/; Max-Age=0",
        name
    )
}
