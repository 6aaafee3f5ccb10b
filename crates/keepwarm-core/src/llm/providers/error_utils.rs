//! Turning backend failures into short, secret-free `BackendError`s.
//!
//! Ping failures end up in a one-line user warning, so error bodies are
//! reduced to the provider's own message where one exists, scrubbed of
//! credentials, and capped in length.

use crate::error::BackendError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const MAX_MESSAGE_CHARS: usize = 1_024;
const REDACTED: &str = "[REDACTED]";
const SENSITIVE_KEYS: &[&str] = &[
    "api_key",
    "token",
    "secret",
    "password",
    "authorization",
    "cookie",
];

static BEARER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._\-+/=]{8,}").expect("valid bearer token regex")
});

static ASSIGNED_SECRET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(api[_-]?key|access[_-]?token|token|secret|password|authorization|x-api-key)\b\s*[:=]\s*["']?[^"',\s}]+"#,
    )
    .expect("valid assigned secret regex")
});

/// Describe an error response body in one line.
///
/// Both Anthropic and OpenAI-style APIs answer with
/// `{"error": {"type": ..., "message": ...}}`; that pair is preferred over
/// the raw body. Anything else is passed through after redaction.
pub fn describe_error_body(raw: &str) -> String {
    let body = raw.trim();
    if body.is_empty() {
        return "<empty error response body>".to_string();
    }

    let description = match serde_json::from_str::<Value>(body) {
        Ok(mut json) => {
            scrub_json(&mut json);
            provider_message(&json).unwrap_or_else(|| json.to_string())
        }
        Err(_) => scrub_text(body),
    };
    truncate(description)
}

fn provider_message(json: &Value) -> Option<String> {
    let error = json.get("error")?;
    let message = error.get("message").and_then(Value::as_str)?;
    match error.get("type").and_then(Value::as_str) {
        Some(kind) => Some(format!("{}: {}", kind, message)),
        None => Some(message.to_string()),
    }
}

fn scrub_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *val = Value::String(REDACTED.to_string());
                } else {
                    scrub_json(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(scrub_json),
        Value::String(s) => *s = scrub_text(s),
        _ => {}
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase().replace(['-', ' '], "_");
    SENSITIVE_KEYS.iter().any(|needle| key.contains(needle))
}

fn scrub_text(text: &str) -> String {
    let text = BEARER_RE.replace_all(text, "Bearer [REDACTED]");
    ASSIGNED_SECRET_RE
        .replace_all(&text, "$1=[REDACTED]")
        .into_owned()
}

fn truncate(text: String) -> String {
    let total = text.chars().count();
    if total <= MAX_MESSAGE_CHARS {
        return text;
    }
    let kept: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
    format!("{}... [truncated {} chars]", kept, total - MAX_MESSAGE_CHARS)
}

/// Build a `BackendError::Api` from a non-success HTTP response
pub async fn handle_http_error(response: reqwest::Response, provider: &str) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::api(provider, status, describe_error_body(&body))
}

/// Build a `BackendError::Transport` from a failed `send()`
pub fn handle_send_error(err: reqwest::Error, provider: &str) -> BackendError {
    if err.is_timeout() {
        BackendError::transport(format!("{} request timed out", provider))
    } else {
        BackendError::transport(format!("{} request failed: {}", provider, err))
    }
}
