//! # API Client
//!
//! Issues authenticated calls against the approval server and normalizes the
//! response envelope. Every call carries the identity headers
//! ([`HEADER_USER`], [`HEADER_SESSION`]) sourced from the current session
//! snapshot, and every envelope is classified exactly once by [`triage`] so
//! auth-expiry handling is identical no matter which page triggered the call.

use std::fmt;

use log::{debug, warn};
use serde_json::Value;

use super::types::Envelope;

/// Identity header: the calling username.
pub const HEADER_USER: &str = "X-Auth-User";
/// Identity header: the opaque session token.
pub const HEADER_SESSION: &str = "X-Auth-Session";

/// Error-text marker meaning the session is no longer valid. Matching is
/// case-insensitive on substring.
pub const AUTH_LOST_MARKER: &str = "not authorized";

/// Transport-level failures: the request never produced a structured
/// envelope. Application-level failures travel inside the envelope instead.
#[derive(Debug)]
pub enum ApiError {
    /// Network failure (timeout, DNS, connection refused).
    Network(String),
    /// Non-success HTTP status without a decodable envelope.
    Http { status: u16 },
    /// Body was not a valid envelope.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Http { status } => write!(f, "server error (HTTP {status})"),
            ApiError::Parse(msg) => write!(f, "response parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Snapshot of the identity headers for one call. Taken from the session at
/// spawn time so background tasks never reach back into shared state.
#[derive(Debug, Clone, Default)]
pub struct AuthHeaders {
    pub username: String,
    pub token: String,
}

/// Classification of an envelope by the single response funnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Triage {
    /// `status == "OK"`: payload fields are meaningful.
    Ok,
    /// Application failure: surface the error, session stays valid.
    AppError(String),
    /// Authorization lost: the session token is dead. Fatal to the session.
    AuthLost(String),
}

/// Classify an envelope. Called on every response before any page sees it.
pub fn triage(envelope: &Envelope) -> Triage {
    if envelope.is_ok() {
        return Triage::Ok;
    }
    let error = envelope
        .error
        .clone()
        .unwrap_or_else(|| format!("request failed (status {})", envelope.status));
    if error.to_lowercase().contains(AUTH_LOST_MARKER) {
        Triage::AuthLost(error)
    } else {
        Triage::AppError(error)
    }
}

/// Authenticated HTTP client for the server's method-dispatch API
/// (`POST {base}/api?method=<name>` with a JSON body).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String, accept_invalid_certs: bool) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call one API method. The envelope is always returned when the server
    /// produced one, even on application-level failure; the caller-side
    /// funnel decides what happens next.
    pub async fn call(
        &self,
        method: &str,
        body: &Value,
        auth: &AuthHeaders,
    ) -> Result<Envelope, ApiError> {
        let url = format!("{}/api?method={}", self.base_url, urlencoding::encode(method));
        debug!("API call: {}", method);

        let response = self
            .http
            .post(&url)
            .header(HEADER_USER, &auth.username)
            .header(HEADER_SESSION, &auth.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        match serde_json::from_str::<Envelope>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                warn!("API method '{}' failed: HTTP {}", method, status.as_u16());
                Err(ApiError::Http {
                    status: status.as_u16(),
                })
            }
            Err(e) => Err(ApiError::Parse(e.to_string())),
        }
    }
}
