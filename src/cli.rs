//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use clap::Parser;
use tracing::{error, warn};
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "storefront-gate",
    about = "Session gateway for the marketplace front end"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "PORT")]
    pub port: u16,

    /// Base URL of the backend API (e.g., "https://api.example.com")
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:5000")]
    pub backend_url: String,

    /// Path to file containing the JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.is_empty() {
        error!("JWT secret is empty");
        return None;
    }

    // The backend owns the secret, so a short one is reported rather than refused.
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        warn!(
            "JWT secret is shorter than {} characters",
            MIN_JWT_SECRET_LENGTH
        );
    }

    Some(secret)
}

/// Parse and validate the backend URL.
/// Returns None and logs an error if validation fails.
pub fn validate_backend_url(backend_url: &str) -> Option<Url> {
    let url = match Url::parse(backend_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %backend_url, error = %e, "Invalid backend URL");
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        error!(url = %backend_url, "Backend URL must use http or https");
        return None;
    }

    let is_localhost = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));
    if url.scheme() == "http" && !is_localhost {
        warn!(url = %backend_url, "Backend URL is not using HTTPS");
    }

    Some(url)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(backend_url: Url, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        backend_url,
        jwt_secret: jwt_secret.into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_backend_url() {
        assert!(validate_backend_url("https://api.example.com").is_some());
        assert!(validate_backend_url("http://localhost:5000").is_some());
        assert!(validate_backend_url("ftp://api.example.com").is_none());
        assert!(validate_backend_url("not a url").is_none());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["storefront-gate", "--backend-url", "https://api.example.com"])
            .unwrap();
        assert_eq!(args.backend_url, "https://api.example.com");
        assert!(matches!(args.log_format, LogFormat::Pretty));
    }
}
