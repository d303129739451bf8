//! Server-side session bootstrap and the page shell it is rendered into.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::auth::{THEME_COOKIE_NAME, TokenPair, get_cookie};
use crate::backend::BackendClient;
use crate::jwt::JwtConfig;
use crate::session::SessionContext;
use crate::theme::Theme;

/// Cache policy for rendered pages: they embed per-user state.
pub const NO_STORE: &str = "no-store";

const SESSION_SCRIPT_OPEN: &str = "<script id=\"__SESSION__\" type=\"application/json\">";

/// Initial payload handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hydration {
    pub state: SessionContext,
    /// Client should run the refresh orchestrator after mounting.
    pub refresh: bool,
}

#[derive(Clone)]
pub struct PageState {
    pub jwt: Arc<JwtConfig>,
    pub backend: BackendClient,
}

/// Build the initial session for a page render. Never fails; missing
/// data degrades to empty collections.
pub async fn bootstrap_session(
    headers: &HeaderMap,
    jwt: &JwtConfig,
    backend: &BackendClient,
) -> Hydration {
    let theme = Theme::from_cookie(get_cookie(headers, THEME_COOKIE_NAME));
    let tokens = TokenPair::from_headers(headers);

    let identity = jwt.identity_from_token(tokens.access.as_deref());
    let mut state = SessionContext::new(identity, theme);

    if let Some(user_id) = state.user_id().map(str::to_owned) {
        let (cart, courses) = futures::join!(
            backend.cart(&user_id),
            backend.enrolled_courses(&user_id)
        );

        state.cart_data = cart.unwrap_or_else(|e| {
            warn!(user_id = %user_id, error = %e, "Failed to load cart");
            Vec::new()
        });
        state.enrolled_courses = courses.unwrap_or_else(|e| {
            warn!(user_id = %user_id, error = %e, "Failed to load enrolled courses");
            Vec::new()
        });
    }

    Hydration {
        state,
        refresh: tokens.needs_refresh(),
    }
}

/// Serialize for embedding inside a `<script>` element.
fn script_safe_json(hydration: &Hydration) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(hydration)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn render_shell(hydration: &Hydration, payload: &str) -> String {
    format!(
        concat!(
            "<!doctype html>\n",
            "<html lang=\"en\" data-theme=\"{theme}\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "{session_open}{payload}</script>\n",
            "<script type=\"module\" src=\"/static/app.js\"></script>\n",
            "</head>\n",
            "<body>\n<div id=\"root\"></div>\n</body>\n",
            "</html>\n"
        ),
        theme = hydration.state.theme,
        session_open = SESSION_SCRIPT_OPEN,
        payload = payload,
    )
}

/// Fallback handler for every page route.
pub async fn page_handler(State(state): State<PageState>, headers: HeaderMap) -> Response {
    let hydration = bootstrap_session(&headers, &state.jwt, &state.backend).await;

    let payload = match script_safe_json(&hydration) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "Failed to serialize session");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, NO_STORE),
        ],
        render_shell(&hydration, &payload),
    )
        .into_response()
}

/// Pull the hydration payload back out of a rendered page. This is how a
/// client mounts: it reads the state the server rendered it with.
pub fn extract_hydration(html: &str) -> Option<Hydration> {
    let start = html.find(SESSION_SCRIPT_OPEN)? + SESSION_SCRIPT_OPEN.len();
    let end = start + html[start..].find("</script>")?;
    serde_json::from_str(&html[start..end]).ok()
}
