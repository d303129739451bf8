//! Cookie-carried bearer tokens.
//!
//! Two opaque tokens issued by the backend: a short-lived access token
//! (2 hours) and a long-lived refresh token (30 days). This server never
//! issues them; it only stores, reads and clears the cookies.

mod cookie;
mod tokens;

pub use cookie::{
    ACCESS_COOKIE_MAX_AGE, ACCESS_COOKIE_NAME, REFRESH_COOKIE_MAX_AGE, REFRESH_COOKIE_NAME,
    THEME_COOKIE_MAX_AGE, THEME_COOKIE_NAME, access_cookie, clear_token_cookie, get_cookie,
    get_non_empty_cookie, is_cookie_safe_token, refresh_cookie, refreshed_access_cookie,
    theme_cookie,
};
pub use tokens::{TokenPair, check_token};
