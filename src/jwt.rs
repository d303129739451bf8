//! Access token inspection.
//!
//! Tokens are issued by the backend and signed with a shared HS256 secret.
//! Expiry is checked on the unverified payload first so stale tokens are
//! rejected without doing any cryptographic work.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::identity::Identity;

/// Prefix stripped from tokens read from an `Authorization`-style source.
pub const BEARER_PREFIX: &str = "Bearer ";

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Embedded user object
    pub user: Identity,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Why a token did not yield an identity.
#[derive(Debug)]
pub enum VerifyError {
    /// No token was supplied
    Absent,
    /// `exp` is in the past
    Expired,
    /// Not a JWT, undecodable payload, or missing claims
    Malformed(String),
    /// Signature does not match the shared secret
    InvalidSignature,
}

impl VerifyError {
    /// Absent and expired tokens are ordinary anonymous traffic.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, VerifyError::Absent | VerifyError::Expired)
    }
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Absent => write!(f, "No token"),
            VerifyError::Expired => write!(f, "Token expired"),
            VerifyError::Malformed(e) => write!(f, "Malformed token: {}", e),
            VerifyError::InvalidSignature => write!(f, "Invalid token signature"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Errors from minting a token locally.
#[derive(Debug)]
pub enum IssueError {
    Encoding(jsonwebtoken::errors::Error),
    TimeError,
}

impl std::fmt::Display for IssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            IssueError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for IssueError {}

#[derive(Deserialize)]
struct UnverifiedExpiry {
    exp: Option<u64>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Read `exp` from the payload segment without checking the signature.
fn unverified_expiry(token: &str) -> Result<Option<u64>, VerifyError> {
    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(VerifyError::Malformed("expected three segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| VerifyError::Malformed(e.to_string()))?;
    let claims: UnverifiedExpiry =
        serde_json::from_slice(&bytes).map_err(|e| VerifyError::Malformed(e.to_string()))?;
    Ok(claims.exp)
}

/// Shared-secret verifier for backend-issued tokens.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Verify a token and return its full payload.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, VerifyError> {
        if let Some(exp) = unverified_expiry(token)? {
            if exp < now_secs() {
                return Err(VerifyError::Expired);
            }
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Malformed(e.to_string()),
            })
    }

    /// Resolve an optional cookie value to the embedded identity.
    pub fn inspect(&self, token: Option<&str>) -> Result<Identity, VerifyError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(VerifyError::Absent)?;
        self.verify(token).map(|claims| claims.user)
    }

    /// Like [`inspect`](Self::inspect) but collapses every failure to `None`.
    /// Malformed and forged tokens are logged; absent and expired ones are not.
    pub fn identity_from_token(&self, token: Option<&str>) -> Option<Identity> {
        match self.inspect(token) {
            Ok(identity) => Some(identity),
            Err(e) if e.is_anonymous() => None,
            Err(e) => {
                warn!(error = %e, "Rejected access token");
                None
            }
        }
    }

    /// Verify a token that may carry a `Bearer ` prefix.
    pub fn verify_bearer(&self, raw: &str) -> Result<AccessClaims, VerifyError> {
        let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(VerifyError::Absent);
        }
        self.verify(token)
    }

    /// Sign arbitrary claims. Production tokens come from the backend; this
    /// exists for the development stub and tests.
    pub fn encode(&self, claims: &AccessClaims) -> Result<String, IssueError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding_key)
            .map_err(IssueError::Encoding)
    }

    /// Sign a token for `user` valid for `ttl_secs` from now.
    pub fn issue_access_token(&self, user: &Identity, ttl_secs: u64) -> Result<String, IssueError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| IssueError::TimeError)?
            .as_secs();

        self.encode(&AccessClaims {
            user: user.clone(),
            iat: now,
            exp: now + ttl_secs,
        })
    }
}
