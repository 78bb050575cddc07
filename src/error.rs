//! Error types for the Tasklight client.
//!
//! Every failure that crosses the gateway boundary is an [`ApiError`] whose
//! `Display` output is the user-presentable message; callers never see a raw
//! transport error. Each variant also carries a stable error code
//! (SCREAMING_SNAKE_CASE) accessible via [`ApiError::code()`]. Codes are part
//! of the public API contract and will not change.

/// Stable error codes for programmatic error handling.
///
/// Use these for distinguishing errors rather than parsing Display output.
pub mod error_codes {
    /// No, malformed, or expired local token; resolved by forcing login.
    pub const AUTH_INVALID: &str = "AUTH_INVALID";

    /// Server asserted 401 on an otherwise well-formed request.
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

    /// No response received (connection refused, DNS failure).
    pub const NETWORK_UNREACHABLE: &str = "NETWORK_UNREACHABLE";

    /// The request exceeded its deadline.
    pub const TIMEOUT: &str = "TIMEOUT";

    /// A 4xx response other than 401.
    pub const CLIENT_ERROR: &str = "CLIENT_ERROR";

    /// A 5xx response.
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
}

/// Fallback user-facing messages, keyed by HTTP status.
///
/// Used only when the response body carries no structured `message` field.
pub(crate) fn status_fallback_message(status: u16) -> &'static str {
    match status {
        400 => "Invalid request. Please check your input.",
        401 => "Please log in to continue.",
        403 => "You don't have permission to perform this action.",
        404 => "The requested resource was not found.",
        409 => "This action conflicts with existing data.",
        422 => "Invalid data provided. Please check your input.",
        429 => "Too many requests. Please try again later.",
        500 => "Server error. Please try again.",
        503 => "Service temporarily unavailable. Please try again later.",
        s if (500..600).contains(&s) => "Server error. Please try again.",
        _ => "An unexpected error occurred. Please try again.",
    }
}

/// Message for a request that received no response at all.
pub(crate) const NETWORK_MESSAGE: &str = "Unable to connect to the server. Please try again.";

/// Message for a request that exceeded its deadline.
pub(crate) const TIMEOUT_MESSAGE: &str =
    "Request timeout. Please check your connection and try again.";

/// Errors produced by the Tasklight client.
///
/// The `Display` impl is exactly the translated human-readable message, with
/// no code prefix, so it can be shown inline in a form untouched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed, or locally-expired session token.
    #[error("{0}")]
    AuthInvalid(String),

    /// The server rejected the credential with 401.
    #[error("{0}")]
    Unauthorized(String),

    /// No response was received from the server.
    #[error("{0}")]
    NetworkUnreachable(String),

    /// The request timed out.
    #[error("{0}")]
    Timeout(String),

    /// A 4xx response other than 401.
    #[error("{message}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Translated user-facing message.
        message: String,
    },

    /// A 5xx response.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Translated user-facing message.
        message: String,
    },
}

impl ApiError {
    /// Build an error from an HTTP status and the optional structured message
    /// extracted from the response body.
    ///
    /// Precedence per the translation contract: the body's `message` field
    /// wins over the static status map, which wins over the generic fallback
    /// (the fallback is folded into [`status_fallback_message`]).
    pub fn from_status(status: u16, body_message: Option<String>) -> Self {
        let message = body_message.unwrap_or_else(|| status_fallback_message(status).to_string());
        match status {
            401 => Self::Unauthorized(message),
            s if (400..500).contains(&s) => Self::Client { status: s, message },
            s => Self::Server { status: s, message },
        }
    }

    /// The error for a connection-class failure (no response received).
    pub fn network_unreachable() -> Self {
        Self::NetworkUnreachable(NETWORK_MESSAGE.to_string())
    }

    /// The error for an expired request deadline.
    pub fn timeout() -> Self {
        Self::Timeout(TIMEOUT_MESSAGE.to_string())
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthInvalid(_) => error_codes::AUTH_INVALID,
            Self::Unauthorized(_) => error_codes::UNAUTHORIZED,
            Self::NetworkUnreachable(_) => error_codes::NETWORK_UNREACHABLE,
            Self::Timeout(_) => error_codes::TIMEOUT,
            Self::Client { .. } => error_codes::CLIENT_ERROR,
            Self::Server { .. } => error_codes::SERVER_ERROR,
        }
    }

    /// Returns the user-presentable message (same text as `Display`).
    pub fn message(&self) -> &str {
        match self {
            Self::AuthInvalid(m)
            | Self::Unauthorized(m)
            | Self::NetworkUnreachable(m)
            | Self::Timeout(m) => m,
            Self::Client { message, .. } | Self::Server { message, .. } => message,
        }
    }

    /// Returns the HTTP status this error was translated from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if this error means the session must be re-established.
    ///
    /// Both local invalidity and a server-asserted 401 resolve the same way:
    /// through the login flow.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthInvalid(_) | Self::Unauthorized(_))
    }

    /// Returns true if retrying the same request might succeed.
    ///
    /// Network failures, timeouts, rate limits, and server errors are
    /// transient; auth failures and other 4xx need a different request.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AuthInvalid(_) | Self::Unauthorized(_) => false,
            Self::NetworkUnreachable(_) | Self::Timeout(_) | Self::Server { .. } => true,
            Self::Client { status, .. } => *status == 429,
        }
    }
}

impl From<crate::session::store::StoreError> for ApiError {
    /// A session that cannot be persisted locally is resolved the same way
    /// as a missing one: the caller has to log in again.
    fn from(e: crate::session::store::StoreError) -> Self {
        Self::AuthInvalid(e.to_string())
    }
}

/// Convenience alias for client results.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_message_wins_over_status_map() {
        let err = ApiError::from_status(404, Some("Task not found".into()));
        assert_eq!(err.to_string(), "Task not found");
        assert_eq!(err.code(), "CLIENT_ERROR");
    }

    #[test]
    fn status_map_used_without_body_message() {
        let err = ApiError::from_status(404, None);
        assert_eq!(err.to_string(), "The requested resource was not found.");
    }

    #[test]
    fn unknown_status_uses_generic_fallback() {
        let err = ApiError::from_status(418, None);
        assert_eq!(
            err.to_string(),
            "An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn unmapped_5xx_uses_server_message() {
        let err = ApiError::from_status(502, None);
        assert_eq!(err.to_string(), "Server error. Please try again.");
        assert_eq!(err.code(), "SERVER_ERROR");
    }

    #[test]
    fn status_401_maps_to_unauthorized() {
        let err = ApiError::from_status(401, None);
        assert_eq!(err.code(), "UNAUTHORIZED");
        assert_eq!(err.to_string(), "Please log in to continue.");
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn status_4xx_maps_to_client() {
        let err = ApiError::from_status(422, None);
        assert_eq!(err.code(), "CLIENT_ERROR");
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_auth());
    }

    #[test]
    fn status_5xx_maps_to_server() {
        let err = ApiError::from_status(503, None);
        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(
            err.to_string(),
            "Service temporarily unavailable. Please try again later."
        );
    }

    #[test]
    fn network_and_timeout_messages_are_distinct() {
        let net = ApiError::network_unreachable();
        let timeout = ApiError::timeout();
        assert_ne!(net.to_string(), timeout.to_string());
        assert_eq!(net.code(), "NETWORK_UNREACHABLE");
        assert_eq!(timeout.code(), "TIMEOUT");
    }

    #[test]
    fn message_matches_display() {
        let errors = vec![
            ApiError::AuthInvalid("no token".into()),
            ApiError::from_status(401, None),
            ApiError::network_unreachable(),
            ApiError::timeout(),
            ApiError::from_status(409, None),
            ApiError::from_status(500, None),
        ];
        for err in &errors {
            assert_eq!(err.message(), err.to_string());
        }
    }

    #[test]
    fn retryable_classification() {
        assert!(!ApiError::AuthInvalid("x".into()).is_retryable());
        assert!(!ApiError::from_status(401, None).is_retryable());
        assert!(!ApiError::from_status(404, None).is_retryable());
        assert!(ApiError::from_status(429, None).is_retryable());
        assert!(ApiError::from_status(500, None).is_retryable());
        assert!(ApiError::network_unreachable().is_retryable());
        assert!(ApiError::timeout().is_retryable());
    }

    #[test]
    fn status_absent_for_local_errors() {
        assert_eq!(ApiError::AuthInvalid("x".into()).status(), None);
        assert_eq!(ApiError::network_unreachable().status(), None);
        assert_eq!(ApiError::timeout().status(), None);
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }

    #[test]
    fn all_codes_are_screaming_snake_case() {
        let errors = vec![
            ApiError::AuthInvalid("x".into()),
            ApiError::from_status(401, None),
            ApiError::network_unreachable(),
            ApiError::timeout(),
            ApiError::from_status(400, None),
            ApiError::from_status(500, None),
        ];
        for err in &errors {
            let code = err.code();
            assert!(
                code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "code {code:?} is not SCREAMING_SNAKE_CASE"
            );
        }
    }
}
