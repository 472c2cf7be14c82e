//! Provider failure classification.
//!
//! Raw provider errors never reach callers: every failure is mapped exactly
//! once into an immutable [`ErrorReport`] by [`classify`]. Matching is
//! keyword/status based over the error's message, evaluated in a fixed
//! priority order — auth → rate_limit → entity_not_found → network → server
//! → unknown — because provider messages can contain overlapping keywords
//! (e.g. "rate limit exceeded for this API key" is still an auth problem
//! only when the auth indicators match first).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    RateLimit,
    /// Provider-side assistant/thread configuration is missing. Handled
    /// internally by the fallback cascade, never user-fatal.
    EntityNotFound,
    Network,
    Server,
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::EntityNotFound => "entity_not_found",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Classified provider failure (immutable — created once, never re-classified).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// The original provider message, verbatim.
    pub message: String,
    /// Operator-facing guidance.
    pub recommendation: String,
    pub retryable: bool,
    pub fatal: bool,
}

impl ErrorReport {
    fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        recommendation: &str,
        retryable: bool,
        fatal: bool,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            recommendation: recommendation.to_string(),
            retryable,
            fatal,
        }
    }
}

const AUTH_KEYWORDS: &[&str] = &[
    "api key",
    "api_key",
    "unauthorized",
    "authentication",
    "invalid key",
    "permission denied",
    "forbidden",
];

const RATE_LIMIT_KEYWORDS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "too many requests",
    "quota",
    "billing",
];

const NOT_FOUND_KEYWORDS: &[&str] = &[
    "no assistant found",
    "no thread found",
    "not found",
    "does not exist",
];

const NETWORK_KEYWORDS: &[&str] = &[
    "connection",
    "network",
    "dns",
    "timed out",
    "broken pipe",
    "reset by peer",
];

const SERVER_KEYWORDS: &[&str] = &[
    "internal server error",
    "bad gateway",
    "service unavailable",
    "overloaded",
    "server_error",
];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Classify a raw provider failure into an [`ErrorReport`].
///
/// `message` is matched case-insensitively against per-kind keyword sets;
/// `status` is the HTTP status code when the failure carried one. The first
/// matching kind in priority order wins. Unmatched failures are `Unknown`
/// and treated as retryable.
pub fn classify(message: &str, status: Option<u16>) -> ErrorReport {
    let lowered = message.to_lowercase();

    if matches!(status, Some(401) | Some(403)) || contains_any(&lowered, AUTH_KEYWORDS) {
        return ErrorReport::new(
            ErrorKind::Auth,
            message,
            "Check the provider API key and account permissions.",
            false,
            true,
        );
    }

    if status == Some(429) || contains_any(&lowered, RATE_LIMIT_KEYWORDS) {
        return ErrorReport::new(
            ErrorKind::RateLimit,
            message,
            "Wait a moment and retry; review plan limits if this persists.",
            true,
            false,
        );
    }

    if status == Some(404) || contains_any(&lowered, NOT_FOUND_KEYWORDS) {
        return ErrorReport::new(
            ErrorKind::EntityNotFound,
            message,
            "The configured assistant id is missing or misconfigured; the \
             single-shot provider will be used instead.",
            false,
            false,
        );
    }

    if contains_any(&lowered, NETWORK_KEYWORDS) {
        return ErrorReport::new(
            ErrorKind::Network,
            message,
            "Check connectivity to the provider and retry.",
            true,
            false,
        );
    }

    if matches!(status, Some(s) if (500..=599).contains(&s))
        || contains_any(&lowered, SERVER_KEYWORDS)
    {
        return ErrorReport::new(
            ErrorKind::Server,
            message,
            "The provider is having trouble; retry after a short delay.",
            true,
            false,
        );
    }

    ErrorReport::new(
        ErrorKind::Unknown,
        message,
        "Retry once; if the failure persists, inspect the provider logs.",
        true,
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_by_status() {
        let report = classify("something went wrong", Some(401));
        assert_eq!(report.kind, ErrorKind::Auth);
        assert!(!report.retryable);
        assert!(report.fatal);
    }

    #[test]
    fn auth_by_keyword() {
        let report = classify("Incorrect API key provided", None);
        assert_eq!(report.kind, ErrorKind::Auth);
    }

    #[test]
    fn auth_wins_over_rate_limit() {
        // Overlapping keywords: auth is matched first by priority order.
        let report = classify("invalid api key: rate limit applies to this key", None);
        assert_eq!(report.kind, ErrorKind::Auth);
    }

    #[test]
    fn rate_limit_by_status_and_keyword() {
        assert_eq!(classify("slow down", Some(429)).kind, ErrorKind::RateLimit);
        let report = classify("Rate limit reached for requests", None);
        assert_eq!(report.kind, ErrorKind::RateLimit);
        assert!(report.retryable);
        assert!(!report.fatal);
    }

    #[test]
    fn missing_assistant_is_entity_not_found() {
        let report = classify("No assistant found with id 'asst_abc123'", None);
        assert_eq!(report.kind, ErrorKind::EntityNotFound);
        assert!(!report.retryable);
        assert!(!report.fatal);
    }

    #[test]
    fn network_failures_are_retryable() {
        let report = classify("connection refused", None);
        assert_eq!(report.kind, ErrorKind::Network);
        assert!(report.retryable);
    }

    #[test]
    fn server_errors_by_status_range() {
        assert_eq!(classify("oops", Some(500)).kind, ErrorKind::Server);
        assert_eq!(classify("oops", Some(503)).kind, ErrorKind::Server);
        assert_eq!(
            classify("The server is overloaded", None).kind,
            ErrorKind::Server
        );
    }

    #[test]
    fn unmatched_is_unknown() {
        let report = classify("mysterious failure", None);
        assert_eq!(report.kind, ErrorKind::Unknown);
        assert!(report.retryable);
        assert!(!report.fatal);
    }

    #[test]
    fn message_is_preserved_verbatim() {
        let report = classify("Connection Reset By Peer", None);
        assert_eq!(report.message, "Connection Reset By Peer");
        assert_eq!(report.kind, ErrorKind::Network);
    }

    #[test]
    fn report_display_includes_kind() {
        let report = classify("quota exceeded", None);
        assert_eq!(report.to_string(), "rate_limit: quota exceeded");
    }
}
