//! Structural JWT decoding.
//!
//! The client never verifies signatures; the backend is the authority on
//! token validity. What the client needs is the *claims payload* of the
//! compact three-segment form, decoded defensively: a malformed token is a
//! state ("not authenticated"), not an error.
//!
//! # Decode Model
//!
//! [`decode_claims`] returns a [`TokenDecode`]:
//!
//! - [`Decoded`](TokenDecode::Decoded): payload parsed into [`Claims`]
//! - [`Invalid`](TokenDecode::Invalid): any structural failure, with a
//!   [`DecodeFailure`] saying which step rejected it

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

// ── Types ──────────────────────────────────────────────────────

/// Claims carried in a session token payload.
///
/// All fields are optional; unknown claims are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the user id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry as epoch seconds. Absent means the token never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Any further claims, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Whether the token is expired at `now` (epoch seconds).
    ///
    /// The boundary counts as expired: a token with `exp == now` is dead.
    /// Tokens without an `exp` claim never expire.
    pub fn is_expired(&self, now: i64) -> bool {
        match self.exp {
            Some(exp) => now >= exp,
            None => false,
        }
    }

    /// Whether the token expires within `secs` seconds of `now`.
    ///
    /// False for tokens without an `exp` claim.
    pub fn expires_within(&self, now: i64, secs: i64) -> bool {
        match self.exp {
            Some(exp) => exp - now < secs,
            None => false,
        }
    }
}

/// Which decode step rejected a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Not exactly three non-empty dot-separated segments.
    Structure,
    /// Payload segment is not valid base64 or not UTF-8.
    Encoding(String),
    /// Payload text is not a JSON claims object.
    Json(String),
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => write!(f, "not a three-segment token"),
            Self::Encoding(detail) => write!(f, "payload encoding invalid: {detail}"),
            Self::Json(detail) => write!(f, "payload is not a claims object: {detail}"),
        }
    }
}

/// Outcome of a structural token decode.
///
/// Deliberately not a `Result`: an undecodable token is an expected state
/// the session layer folds into "not authenticated", never a propagated
/// error.
#[derive(Debug, Clone)]
pub enum TokenDecode {
    /// Payload parsed into claims.
    Decoded(Claims),
    /// Token failed structural decoding.
    Invalid(DecodeFailure),
}

impl TokenDecode {
    /// Returns `true` when the token decoded to claims.
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// Returns the decoded claims, or `None`.
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Decoded(claims) => Some(claims),
            Self::Invalid(_) => None,
        }
    }

    /// Consumes the decode, returning the claims if any.
    pub fn into_claims(self) -> Option<Claims> {
        match self {
            Self::Decoded(claims) => Some(claims),
            Self::Invalid(_) => None,
        }
    }
}

// ── Decoding ───────────────────────────────────────────────────

/// Decode the claims payload of a compact three-segment token.
///
/// Steps, each of which can reject the token:
///
/// 1. split on `.`; require exactly three non-empty segments;
/// 2. translate the middle segment from the URL-safe alphabet
///    (`-` to `+`, `_` to `/`) and pad with `=` to a multiple of four;
/// 3. base64-decode, interpret as UTF-8, parse as a JSON object.
///
/// Never panics and never returns an error; failures come back as
/// [`TokenDecode::Invalid`] and are logged at `warn!`.
pub fn decode_claims(token: &str) -> TokenDecode {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        warn!(
            segments = segments.len(),
            "token rejected: expected three non-empty segments"
        );
        return TokenDecode::Invalid(DecodeFailure::Structure);
    }

    let translated = segments[1].replace('-', "+").replace('_', "/");
    let payload = match translated.len() % 4 {
        0 => translated,
        rem => {
            let mut padded = translated;
            for _ in rem..4 {
                padded.push('=');
            }
            padded
        }
    };

    let bytes = match STANDARD.decode(payload.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "token payload is not valid base64");
            return TokenDecode::Invalid(DecodeFailure::Encoding(e.to_string()));
        }
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "token payload is not valid UTF-8");
            return TokenDecode::Invalid(DecodeFailure::Encoding(e.to_string()));
        }
    };

    match serde_json::from_str::<Claims>(&text) {
        Ok(claims) => TokenDecode::Decoded(claims),
        Err(e) => {
            warn!(error = %e, "token payload is not a JSON claims object");
            TokenDecode::Invalid(DecodeFailure::Json(e.to_string()))
        }
    }
}
