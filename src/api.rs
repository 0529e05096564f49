// API client module: a small blocking HTTP client for the OpsHub superuser
// API. One method per superuser action; every response body goes through
// the classifier in `response` before anything else looks at it.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::response::{check_status, classify_json, classify_text, ApiFailure};

/// Base location used when the operator leaves the startup prompt blank.
pub const DEFAULT_BASE_URL: &str = "https://opshub-backend.onrender.com";

/// Header carrying the superuser access key on authenticated requests.
const ACCESS_KEY_HEADER: &str = "AccessKey";

/// Blocking client bound to one backend location. Unauthenticated by
/// itself; authenticated calls take a `Session` explicitly.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Proof of a successful authentication: holds the access key that the
/// server accepted. Built once by `ApiClient::authenticate`, immutable for
/// the rest of the run, dropped on exit. There is no proactive
/// revalidation; a key revoked mid-session surfaces as a normal classified
/// failure on the next call.
pub struct Session {
    access_key: String,
}

/// How the operator identifies an account. Serializes to the single-field
/// payload the backend expects, e.g. `{"userID": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum AccountQuery {
    #[serde(rename = "userID")]
    Id(String),
    #[serde(rename = "username")]
    Username(String),
    #[serde(rename = "email")]
    Email(String),
}

impl AccountQuery {
    pub fn id(value: &str) -> Result<Self, ApiFailure> {
        Self::non_empty(value, "User ID").map(AccountQuery::Id)
    }

    pub fn username(value: &str) -> Result<Self, ApiFailure> {
        Self::non_empty(value, "Username").map(AccountQuery::Username)
    }

    pub fn email(value: &str) -> Result<Self, ApiFailure> {
        Self::non_empty(value, "Email").map(AccountQuery::Email)
    }

    // An empty identifier is rejected here, before any request is built.
    fn non_empty(value: &str, label: &str) -> Result<String, ApiFailure> {
        let value = value.trim();
        if value.is_empty() {
            Err(ApiFailure::local_validation(format!("{} cannot be empty", label)))
        } else {
            Ok(value.to_string())
        }
    }
}

/// Payload for creating an admin account. Field names mirror the backend.
#[derive(Debug, Serialize)]
pub struct NewAdmin {
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// The three feature flags the console can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Analytics,
    Chatbot,
    UsageLock,
}

impl Toggle {
    fn path(self) -> &'static str {
        match self {
            Toggle::Analytics => "/toggleAnalytics",
            Toggle::Chatbot => "/toggleChatbot",
            Toggle::UsageLock => "/toggleUsageLock",
        }
    }

    /// Operator-facing name, used in prompts and progress messages.
    pub fn label(self) -> &'static str {
        match self {
            Toggle::Analytics => "analytics",
            Toggle::Chatbot => "assistant chatbot",
            Toggle::UsageLock => "usage lock",
        }
    }
}

#[derive(Serialize)]
struct ToggleRequest {
    #[serde(rename = "newStatus")]
    new_status: bool,
}

impl ApiClient {
    /// Create a client bound to `base_url` (trailing slashes stripped).
    /// No request timeout is configured: a hung request blocks the console
    /// until the operator interrupts the process, matching the tool's
    /// strictly serial, human-driven usage.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/admin/super{}", self.base_url, path)
    }

    /// Send a request whose response follows the text prefix convention.
    fn send_text(&self, request: RequestBuilder) -> Result<String, ApiFailure> {
        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        check_status(status, &body)?;
        classify_text(&body)
    }

    /// Send a request whose response is JSON on success.
    fn send_json(&self, request: RequestBuilder) -> Result<Value, ApiFailure> {
        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        check_status(status, &body)?;
        classify_json(&body)
    }

    /// Unauthenticated liveness probe of the superuser API. Callers treat
    /// any failure here as fatal; this method just reports it.
    pub fn probe(&self) -> Result<(), ApiFailure> {
        self.send_text(self.client.get(self.endpoint("")))?;
        Ok(())
    }

    /// Attempt to authenticate with `access_key`. On success the key is
    /// fixed into the returned `Session`; on failure nothing is retained.
    pub fn authenticate(&self, access_key: &str) -> Result<Session, ApiFailure> {
        self.send_text(
            self.client
                .post(self.endpoint("/authenticate"))
                .header(ACCESS_KEY_HEADER, access_key),
        )?;
        Ok(Session {
            access_key: access_key.to_string(),
        })
    }

    /// Look up any account (admin, host or guest) by one identifier.
    /// Returns the account record as JSON.
    pub fn account_info(&self, session: &Session, query: &AccountQuery) -> Result<Value, ApiFailure> {
        self.send_json(
            self.client
                .post(self.endpoint("/accountInfo"))
                .header(ACCESS_KEY_HEADER, &session.access_key)
                .json(query),
        )
    }

    pub fn create_admin(&self, session: &Session, admin: &NewAdmin) -> Result<String, ApiFailure> {
        self.send_text(
            self.client
                .post(self.endpoint("/createAdmin"))
                .header(ACCESS_KEY_HEADER, &session.access_key)
                .json(admin),
        )
    }

    pub fn delete_admin(&self, session: &Session, query: &AccountQuery) -> Result<String, ApiFailure> {
        self.send_text(
            self.client
                .post(self.endpoint("/deleteAdmin"))
                .header(ACCESS_KEY_HEADER, &session.access_key)
                .json(query),
        )
    }

    /// Collected system analytics, as arbitrary JSON.
    pub fn analytics(&self, session: &Session) -> Result<Value, ApiFailure> {
        self.send_json(
            self.client
                .post(self.endpoint("/getAnalytics"))
                .header(ACCESS_KEY_HEADER, &session.access_key),
        )
    }

    /// The backend file manager's context snapshot, as arbitrary JSON.
    pub fn file_manager_context(&self, session: &Session) -> Result<Value, ApiFailure> {
        self.send_json(
            self.client
                .get(self.endpoint("/getFileManagerContext"))
                .header(ACCESS_KEY_HEADER, &session.access_key),
        )
    }

    /// The backend's log file as a list of lines (the endpoint returns a
    /// JSON array of strings; anything else is a protocol violation).
    pub fn system_logs(&self, session: &Session) -> Result<Vec<String>, ApiFailure> {
        let value = self.send_json(
            self.client
                .post(self.endpoint("/getLogs"))
                .header(ACCESS_KEY_HEADER, &session.access_key),
        )?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(line) => Ok(line),
                    other => Err(ApiFailure::protocol(other.to_string())),
                })
                .collect(),
            other => Err(ApiFailure::protocol(other.to_string())),
        }
    }

    /// Flip one of the backend's feature flags. Returns the server's
    /// `SUCCESS...` body, which states the new status.
    pub fn toggle(&self, session: &Session, toggle: Toggle, new_status: bool) -> Result<String, ApiFailure> {
        self.send_text(
            self.client
                .post(self.endpoint(toggle.path()))
                .header(ACCESS_KEY_HEADER, &session.access_key)
                .json(&ToggleRequest { new_status }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FailureKind;

    #[test]
    fn empty_identifier_is_rejected_locally() {
        let failure = AccountQuery::id("").unwrap_err();
        assert_eq!(failure.kind, FailureKind::Validation);
        assert!(failure.raw_body.is_none());

        assert!(AccountQuery::username("   ").is_err());
        assert!(AccountQuery::email("\t").is_err());
    }

    #[test]
    fn query_serializes_to_the_single_field_the_backend_expects() {
        let query = AccountQuery::id(" u-123 ").unwrap();
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({"userID": "u-123"})
        );

        let query = AccountQuery::email("ops@example.com").unwrap();
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({"email": "ops@example.com"})
        );
    }

    #[test]
    fn toggle_request_uses_the_backend_field_name() {
        assert_eq!(
            serde_json::to_value(ToggleRequest { new_status: true }).unwrap(),
            serde_json::json!({"newStatus": true})
        );
    }

    #[test]
    fn toggle_paths() {
        assert_eq!(Toggle::Analytics.path(), "/toggleAnalytics");
        assert_eq!(Toggle::Chatbot.path(), "/toggleChatbot");
        assert_eq!(Toggle::UsageLock.path(), "/toggleUsageLock");
    }

    #[test]
    fn endpoints_live_under_the_superuser_prefix() {
        let api = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(api.endpoint(""), "http://localhost:8000/admin/super");
        assert_eq!(
            api.endpoint("/authenticate"),
            "http://localhost:8000/admin/super/authenticate"
        );
    }
}
