use serde_json::Value;
use thiserror::Error;

/// Transport and protocol failures surfaced by the API client.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("too many requests")]
    RateLimited,
    #[error("user is not registered")]
    NotRegistered,
    #[error("verification code is invalid")]
    CodeInvalid,
    #[error("verification code expired")]
    CodeExpired,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Maps a backend reason code (the `detail`/`message` of an error body).
    pub fn from_reason(status: u16, reason: &str) -> Self {
        match reason {
            "RATE_LIMITED" | "TOO_MANY_REQUESTS" => ApiError::RateLimited,
            "NOT_REGISTERED" | "USER_NOT_FOUND" => ApiError::NotRegistered,
            "CODE_INVALID" => ApiError::CodeInvalid,
            "CODE_EXPIRED" => ApiError::CodeExpired,
            _ if status == 429 => ApiError::RateLimited,
            _ if status == 422 || reason.starts_with("VALIDATION") => {
                ApiError::Validation(reason.to_string())
            }
            _ => ApiError::Http {
                status,
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }

    /// Generic inline copy for a failed call.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "Network error. Check your connection.",
            ApiError::RateLimited => "Too many requests. Please wait a moment.",
            ApiError::NotRegistered => {
                "You are not registered. Go to the Bluewave bot, type /start, then open the mini app again."
            }
            ApiError::CodeInvalid => "Invalid code. Please try again.",
            ApiError::CodeExpired => "Code expired. Request a new one.",
            ApiError::Validation(_) => "Some details were not accepted. Please check and retry.",
            ApiError::Http { .. } | ApiError::Decode(_) => "Something went wrong. Try again.",
        }
    }
}

/// Interprets a completed HTTP exchange. Non-2xx statuses become an `ApiError`
/// built from the `detail` or `message` field of the body when present.
pub fn interpret_response(status: u16, body: &str) -> Result<Value, ApiError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if (200..300).contains(&status) {
        return match parsed {
            Some(v) => Ok(v),
            None if body.trim().is_empty() => Ok(Value::Null),
            None => Err(ApiError::Decode(format!("invalid JSON ({} bytes)", body.len()))),
        };
    }
    let reason = parsed
        .as_ref()
        .and_then(|v| {
            v.get("detail")
                .and_then(Value::as_str)
                .or_else(|| v.get("message").and_then(Value::as_str))
        })
        .unwrap_or("API_ERROR");
    Err(ApiError::from_reason(status, reason))
}
