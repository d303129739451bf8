mod error;
mod session;

use axum::Router;

pub use error::ApiError;

/// Create the same-origin API router (mounted under `/api`).
pub fn create_api_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    session::router().fallback(not_found)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
