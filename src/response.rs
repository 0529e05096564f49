// Response classification: the OpsHub superuser API answers every request
// with a plain-text body following a prefix convention (`SUCCESS...`,
// `ERROR: <message>`, `UERROR: <message>`). This module decodes that
// convention exactly once, at the transport boundary, into typed values so
// the rest of the crate never inspects raw string prefixes.

use serde_json::Value;
use thiserror::Error;

const SUCCESS_PREFIX: &str = "SUCCESS";
const ERROR_PREFIX: &str = "ERROR: ";
const UERROR_PREFIX: &str = "UERROR: ";

/// What went wrong, at the granularity the console cares about.
///
/// - `Operational`: the server reported a system-side failure (`ERROR:`).
/// - `Validation`: the server rejected the supplied input (`UERROR:`), or a
///   local check did before any request was sent.
/// - `Transport`: the request never completed normally (connection error,
///   non-2xx status).
/// - `Protocol`: the server answered with a body the prefix convention does
///   not recognize. A 200 without a recognized prefix is still a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Operational,
    Validation,
    Transport,
    Protocol,
}

/// A classified failure from a remote action. Carries the raw response body
/// (when one was received) so the operator can see exactly what the server
/// said before deciding whether to retry.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
    pub raw_body: Option<String>,
}

impl ApiFailure {
    pub fn operational(message: impl Into<String>, raw_body: impl Into<String>) -> Self {
        ApiFailure {
            kind: FailureKind::Operational,
            message: message.into(),
            raw_body: Some(raw_body.into()),
        }
    }

    pub fn validation(message: impl Into<String>, raw_body: impl Into<String>) -> Self {
        ApiFailure {
            kind: FailureKind::Validation,
            message: message.into(),
            raw_body: Some(raw_body.into()),
        }
    }

    /// A local validation failure: no request was sent, so there is no body.
    pub fn local_validation(message: impl Into<String>) -> Self {
        ApiFailure {
            kind: FailureKind::Validation,
            message: message.into(),
            raw_body: None,
        }
    }

    pub fn transport(message: impl Into<String>, raw_body: Option<String>) -> Self {
        ApiFailure {
            kind: FailureKind::Transport,
            message: message.into(),
            raw_body,
        }
    }

    pub fn protocol(body: impl Into<String>) -> Self {
        let body = body.into();
        ApiFailure {
            kind: FailureKind::Protocol,
            message: format!("Unknown response received: {}", body),
            raw_body: Some(body),
        }
    }

    /// The raw body as shown to the operator, `<No response>` when the
    /// request produced none.
    pub fn raw_body_display(&self) -> &str {
        self.raw_body.as_deref().unwrap_or("<No response>")
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        ApiFailure::transport(err.to_string(), None)
    }
}

/// Gate on the HTTP status before looking at the body. Anything outside the
/// 2xx range is a transport-level failure, with the body (which may still be
/// useful to the operator) carried along raw.
pub fn check_status(status: u16, body: &str) -> Result<(), ApiFailure> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ApiFailure::transport(
            format!("HTTP status {}", status),
            Some(body.to_string()),
        ))
    }
}

/// Classify a 2xx body from an endpoint following the text convention: the
/// body must start with `SUCCESS`, otherwise it is one of the two error
/// prefixes or a protocol violation. On success the full body is returned;
/// callers that only care about the remainder strip the prefix themselves.
pub fn classify_text(body: &str) -> Result<String, ApiFailure> {
    if let Some(message) = body.strip_prefix(UERROR_PREFIX) {
        Err(ApiFailure::validation(message, body))
    } else if let Some(message) = body.strip_prefix(ERROR_PREFIX) {
        Err(ApiFailure::operational(message, body))
    } else if body.starts_with(SUCCESS_PREFIX) {
        Ok(body.to_string())
    } else {
        Err(ApiFailure::protocol(body))
    }
}

/// Classify a 2xx body from an endpoint that returns JSON on success
/// (analytics, file manager context, logs, account info). Error prefixes
/// still apply; any other body must parse as JSON.
pub fn classify_json(body: &str) -> Result<Value, ApiFailure> {
    if let Some(message) = body.strip_prefix(UERROR_PREFIX) {
        return Err(ApiFailure::validation(message, body));
    }
    if let Some(message) = body.strip_prefix(ERROR_PREFIX) {
        return Err(ApiFailure::operational(message, body));
    }
    serde_json::from_str(body).map_err(|_| ApiFailure::protocol(body))
}
