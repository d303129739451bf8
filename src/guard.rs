//! Route guard applied in front of every page route.
//!
//! The decision only looks at whether the token cookies are present, never
//! at their validity. Verifying tokens is left to the page renderer.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::percent_decode_str;
use tracing::debug;
use url::form_urlencoded;

use crate::auth::{THEME_COOKIE_NAME, TokenPair, get_cookie};
use crate::theme::{THEME_HEADER, Theme};

/// Paths that bounce signed-in users back home.
const GUEST_ONLY_PATHS: [&str; 3] = ["/login", "/signup", "/identity"];

/// Path prefixes the guard never inspects.
const UNGUARDED_PREFIXES: [&str; 3] = ["/static/", "/images/", "/api/"];

const FAVICON_PATH: &str = "/favicon.ico";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// `path` comes percent-encoded from the request line; decode it first so
/// it is not encoded twice.
fn login_redirect(path: &str) -> GuardDecision {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let encoded: String = form_urlencoded::byte_serialize(decoded.as_bytes()).collect();
    GuardDecision::Redirect(format!("/login?redirectTo={}", encoded))
}

fn home() -> GuardDecision {
    GuardDecision::Redirect("/".to_string())
}

/// Module or item pages below a course, e.g. `/courses/{id}/{module}`.
fn is_course_content(path: &str) -> bool {
    path.starts_with("/courses/") && path.split('/').filter(|s| !s.is_empty()).count() > 2
}

/// Decide what to do with a request. Rules are checked in order.
pub fn decide(access_present: bool, refresh_present: bool, path: &str) -> GuardDecision {
    if access_present && GUEST_ONLY_PATHS.contains(&path) {
        return home();
    }

    if path.contains("/dashboard") && !access_present {
        // A held refresh token goes home; the client refreshes from there.
        return if refresh_present {
            home()
        } else {
            login_redirect(path)
        };
    }

    if is_course_content(path) && !access_present {
        return if refresh_present {
            home()
        } else {
            login_redirect(path)
        };
    }

    GuardDecision::Allow
}

/// Whether the guard applies to this path at all.
pub fn is_guarded(path: &str) -> bool {
    path != FAVICON_PATH
        && !UNGUARDED_PREFIXES
            .iter()
            .any(|prefix| path == prefix.trim_end_matches('/') || path.starts_with(prefix))
}

/// Middleware: redirect per [`decide`], otherwise forward the theme.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_guarded(&path) {
        return next.run(request).await;
    }

    let tokens = TokenPair::from_headers(request.headers());
    if let GuardDecision::Redirect(target) =
        decide(tokens.has_access(), tokens.has_refresh(), &path)
    {
        debug!(path = %path, target = %target, "Route guard redirect");
        return Redirect::temporary(&target).into_response();
    }

    let theme = Theme::from_cookie(get_cookie(request.headers(), THEME_COOKIE_NAME));
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        HeaderName::from_static(THEME_HEADER),
        HeaderValue::from_static(theme.as_str()),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(target: &str) -> GuardDecision {
        GuardDecision::Redirect(target.to_string())
    }

    #[test]
    fn test_signed_in_user_leaves_guest_pages() {
        for path in GUEST_ONLY_PATHS {
            assert_eq!(decide(true, true, path), redirect("/"));
            assert_eq!(decide(true, false, path), redirect("/"));
            assert_eq!(decide(false, true, path), GuardDecision::Allow);
            assert_eq!(decide(false, false, path), GuardDecision::Allow);
        }
    }

    #[test]
    fn test_guest_only_match_is_exact() {
        assert_eq!(decide(true, true, "/login/help"), GuardDecision::Allow);
    }

    #[test]
    fn test_dashboard_rules() {
        assert_eq!(decide(true, true, "/dashboard"), GuardDecision::Allow);
        assert_eq!(decide(true, false, "/dashboard/orders"), GuardDecision::Allow);
        assert_eq!(decide(false, true, "/dashboard/orders"), redirect("/"));
        assert_eq!(
            decide(false, false, "/dashboard/orders"),
            redirect("/login?redirectTo=%2Fdashboard%2Forders")
        );
    }

    #[test]
    fn test_dashboard_substring_anywhere() {
        assert_eq!(
            decide(false, false, "/admin/dashboard"),
            redirect("/login?redirectTo=%2Fadmin%2Fdashboard")
        );
    }

    #[test]
    fn test_redirect_target_is_encoded_once() {
        assert_eq!(
            decide(false, false, "/dashboard/a%20b"),
            redirect("/login?redirectTo=%2Fdashboard%2Fa+b")
        );
        assert_eq!(
            decide(false, false, "/dashboard/100%25"),
            redirect("/login?redirectTo=%2Fdashboard%2F100%25")
        );
    }

    #[test]
    fn test_course_rules() {
        assert_eq!(decide(false, false, "/courses/abc"), GuardDecision::Allow);
        assert_eq!(decide(false, true, "/courses/abc/"), GuardDecision::Allow);
        assert_eq!(decide(false, true, "/courses/abc/mod1/item1"), redirect("/"));
        assert_eq!(
            decide(false, false, "/courses/abc/mod1"),
            redirect("/login?redirectTo=%2Fcourses%2Fabc%2Fmod1")
        );
        assert_eq!(decide(true, false, "/courses/abc/mod1"), GuardDecision::Allow);
    }

    #[test]
    fn test_public_pages_allowed() {
        for (access, refresh) in [(true, true), (true, false), (false, true), (false, false)] {
            assert_eq!(decide(access, refresh, "/"), GuardDecision::Allow);
            assert_eq!(decide(access, refresh, "/blog/post-1"), GuardDecision::Allow);
            assert_eq!(decide(access, refresh, "/shop"), GuardDecision::Allow);
        }
    }

    #[test]
    fn test_is_guarded() {
        assert!(is_guarded("/"));
        assert!(is_guarded("/dashboard"));
        assert!(is_guarded("/apiary"));
        assert!(!is_guarded("/api"));
        assert!(!is_guarded("/api/login"));
        assert!(!is_guarded("/static/app.js"));
        assert!(!is_guarded("/images/logo.png"));
        assert!(!is_guarded("/favicon.ico"));
    }
}
