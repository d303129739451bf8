#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use storefront_gate::{
    ServerConfig, create_app,
    identity::{Identity, Role},
    jwt::{AccessClaims, JwtConfig},
};
use tokio::net::TcpListener;
use url::Url;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-for-storefront-gate";

/// Scripted stand-in for the marketplace API.
#[derive(Clone)]
pub struct MockBackend {
    /// `None` makes the endpoint answer 500
    pub cart: Option<Value>,
    pub courses: Option<Value>,
    /// Added before the cart and course endpoints answer
    pub delay: Duration,
    /// Body returned by the refresh endpoint
    pub refresh: Value,
    pub seen_refresh_cookie: Arc<Mutex<Option<String>>>,
    pub hits: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            cart: Some(json!([])),
            courses: Some(json!([])),
            delay: Duration::ZERO,
            refresh: json!({ "status": 401 }),
            seen_refresh_cookie: Arc::new(Mutex::new(None)),
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockBackend {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn refresh_cookie(&self) -> Option<String> {
        self.seen_refresh_cookie.lock().unwrap().clone()
    }
}

fn reply(body: &Option<Value>) -> Response {
    match body {
        Some(value) => Json(value.clone()).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn mock_cart(State(mock): State<MockBackend>, Path(_user_id): Path<String>) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(mock.delay).await;
    reply(&mock.cart)
}

async fn mock_courses(State(mock): State<MockBackend>, Path(_user_id): Path<String>) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(mock.delay).await;
    reply(&mock.courses)
}

async fn mock_refresh(State(mock): State<MockBackend>, headers: HeaderMap) -> Json<Value> {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *mock.seen_refresh_cookie.lock().unwrap() = cookie;
    Json(mock.refresh.clone())
}

fn mock_routes(mock: MockBackend) -> Router {
    Router::new()
        .route("/api/auth/refresh", post(mock_refresh))
        .route("/api/cart/{user_id}", get(mock_cart))
        .route("/api/courses/enrolled/{user_id}", get(mock_courses))
        .with_state(mock)
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

/// Serve `mock` on a random local port and return its base URL.
pub async fn spawn_backend(mock: MockBackend) -> Url {
    Url::parse(&serve(mock_routes(mock)).await).expect("Invalid URL")
}

/// Serve `mock` below `prefix` only, e.g. `/backend/api/cart/{id}`.
/// The returned base URL includes the prefix.
pub async fn spawn_backend_under(mock: MockBackend, prefix: &str) -> Url {
    let app = Router::new().nest(prefix, mock_routes(mock));
    Url::parse(&format!("{}{}", serve(app).await, prefix)).expect("Invalid URL")
}

/// A base URL nothing is listening on.
pub async fn dead_backend_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    Url::parse(&format!("http://{}", addr)).expect("Invalid URL")
}

pub fn test_config(backend_url: Url) -> ServerConfig {
    ServerConfig {
        backend_url,
        jwt_secret: TEST_SECRET.to_vec(),
    }
}

pub async fn create_test_app(backend_url: Url) -> axum::Router {
    create_app(&test_config(backend_url))
}

pub fn jwt() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

pub fn test_user() -> Identity {
    Identity::new("64f0c0ffee", "Ada", Role::User)
}

pub fn valid_token(user: &Identity) -> String {
    jwt().issue_access_token(user, 3600).unwrap()
}

pub fn expired_token(user: &Identity) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    jwt()
        .encode(&AccessClaims {
            user: user.clone(),
            iat: now - 7300,
            exp: now - 100,
        })
        .unwrap()
}

pub fn forged_token(user: &Identity) -> String {
    JwtConfig::new(b"some-other-secret")
        .issue_access_token(user, 3600)
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
