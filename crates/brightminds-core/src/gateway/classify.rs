//! Mapping of non-2xx responses onto [`AssistantError`] variants.

use crate::error::AssistantError;
use serde_json::Value;

const RATE_LIMIT_HINTS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "too many requests",
    "quota",
    "overloaded",
];

const AUTH_HINTS: &[&str] = &[
    "api key",
    "api_key",
    "unauthorized",
    "authentication",
    "permission",
];

const MAX_SUMMARY_CHARS: usize = 200;

/// Classify a failed response from its status and body.
///
/// The status code wins when it is specific (429, 401, 403, and Anthropic's
/// 529 overload). Generic statuses fall back to keywords in the error text,
/// which is how the proxy reports upstream failures behind a plain 500.
pub fn classify_status(status: u16, body: &str) -> AssistantError {
    let message = error_summary(body);
    match status {
        429 | 529 => AssistantError::RateLimited { status, message },
        401 | 403 => AssistantError::Unauthorized { status, message },
        _ => {
            let lowered = message.to_lowercase();
            if RATE_LIMIT_HINTS.iter().any(|h| lowered.contains(h)) {
                AssistantError::RateLimited { status, message }
            } else if AUTH_HINTS.iter().any(|h| lowered.contains(h)) {
                AssistantError::Unauthorized { status, message }
            } else {
                AssistantError::service(status, message)
            }
        }
    }
}

/// Map a transport failure, keeping timeouts distinct.
pub fn transport_error(err: reqwest::Error) -> AssistantError {
    if err.is_timeout() {
        AssistantError::Timeout
    } else {
        AssistantError::Http(err)
    }
}

/// Pull a readable message out of a vendor error body.
///
/// Handles `{"error": {"message": ..}}` (OpenAI, Anthropic),
/// `{"error": "..", "details": ".."}` (proxy) and `{"error": ".."}` (Ollama).
pub fn error_summary(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("error") {
            Some(Value::Object(obj)) => {
                if let Some(msg) = obj.get("message").and_then(|m| m.as_str()) {
                    return truncate(msg);
                }
            }
            Some(Value::String(err)) => {
                return match value.get("details").and_then(|d| d.as_str()) {
                    Some(details) if !details.is_empty() => truncate(&format!("{err}: {details}")),
                    _ => truncate(err),
                };
            }
            _ => {}
        }
    }
    truncate(body.trim())
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_SUMMARY_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_SUMMARY_CHARS).collect();
    out.push_str("...");
    out
}
