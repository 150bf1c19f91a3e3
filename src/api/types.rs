//! Wire types for the approval server's JSON API.
//!
//! Every response is the uniform envelope `{status, error?, ...payload}`;
//! payload fields vary per method and are only meaningful when
//! `status == "OK"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope status value for success. Anything else is a failure.
pub const STATUS_OK: &str = "OK";

/// Uniform response wrapper. Method-specific payload fields are captured in
/// `payload` and pulled out with [`Envelope::list`] / [`Envelope::field`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, Value>,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Decode a payload field as a list of `T`. Missing or malformed fields
    /// decode to an empty list; entry-level decode errors are logged and
    /// skipped rather than poisoning the whole response.
    pub fn list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(Value::Array(entries)) = self.payload.get(key) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Skipping malformed '{}' entry: {}", key, e);
                    None
                }
            })
            .collect()
    }

    /// Decode a single payload field as `T`.
    pub fn object<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.payload.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::warn!("Failed to decode '{}' payload: {}", key, e);
                None
            }
        }
    }
}

/// The authenticated user as returned by the `auth` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A command template: what may be executed, and how many approvals its
/// execution needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub id: String,
    pub title: String,
    pub command: String,
    /// Minimum number of distinct approvers before dispatch.
    #[serde(default)]
    pub quorum: u32,
    /// Tags selecting which clients the template may target.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagInfo {
    pub id: String,
    pub name: String,
}

/// A registered client machine and the tags assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// A pending consensus request: a command execution awaiting approvals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusRequestInfo {
    pub id: String,
    pub template_id: String,
    #[serde(default)]
    pub template_title: String,
    pub requested_by: String,
    #[serde(default)]
    pub approvals: u32,
    #[serde(default)]
    pub quorum: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One line of captured execution output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub client_id: String,
    pub line: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub logged_at: Option<String>,
}

/// A completed dispatch of an approved request to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub request_id: String,
    pub client_id: String,
    pub state: String,
    #[serde(default)]
    pub dispatched_at: Option<String>,
}
