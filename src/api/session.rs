//! Cookie handoff endpoints.
//!
//! Browsers cannot set httpOnly cookies from script, so the client posts
//! tokens here and the server answers with `Set-Cookie`.

use axum::{
    Json, Router,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{ApiError, require_token};
use crate::auth::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, access_cookie, clear_token_cookie, refresh_cookie,
    refreshed_access_cookie, theme_cookie,
};
use crate::theme::Theme;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/refresh", post(refresh))
        .route("/theme", post(set_theme))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ThemeRequest {
    #[serde(default)]
    theme: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct ThemeResponse {
    theme: Theme,
}

/// Store both tokens after the backend accepted a login or signup.
async fn login(Json(body): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let access = require_token(body.access_token, "accessToken")?;
    let refresh = require_token(body.refresh_token, "refreshToken")?;

    info!("Session cookies set");

    Ok((
        AppendHeaders([
            (SET_COOKIE, access_cookie(&access)),
            (SET_COOKIE, refresh_cookie(&refresh)),
        ]),
        Json(MessageResponse {
            message: "Login successful",
        }),
    ))
}

async fn logout() -> impl IntoResponse {
    info!("Session cookies cleared");

    (
        AppendHeaders([
            (SET_COOKIE, clear_token_cookie(ACCESS_COOKIE_NAME)),
            (SET_COOKIE, clear_token_cookie(REFRESH_COOKIE_NAME)),
        ]),
        Json(MessageResponse {
            message: "Logout successful",
        }),
    )
}

/// Store a freshly refreshed access token. The refresh cookie is untouched.
async fn refresh(Json(body): Json<RefreshRequest>) -> Result<impl IntoResponse, ApiError> {
    let access = require_token(body.access_token, "accessToken")?;

    debug!("Access cookie renewed");

    Ok((
        [(SET_COOKIE, refreshed_access_cookie(&access))],
        Json(MessageResponse {
            message: "Token refreshed",
        }),
    ))
}

async fn set_theme(Json(body): Json<ThemeRequest>) -> impl IntoResponse {
    let theme = Theme::from_cookie(body.theme.as_deref());

    (
        [(SET_COOKIE, theme_cookie(theme))],
        Json(ThemeResponse { theme }),
    )
}
