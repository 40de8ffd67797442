use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum ApiError {
    MissingApiKey,
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    Cancelled,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::InvalidHeader(value) => write!(f, "invalid header: {value}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request was cancelled"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayloadFields {
    message: Option<String>,
}

/// Best-effort human-readable message for a non-2xx response body.
///
/// Prefers `{"error":{"message":...}}` when the body parses as the provider
/// error envelope; otherwise the raw body, or the canonical status reason
/// when the body is empty. The raw body is never discarded by callers that
/// need it; this only shapes the displayed message.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload
            .error
            .and_then(|error| error.message)
            .filter(|message| !message.trim().is_empty())
        {
            return message;
        }
    }

    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::parse_error_message;
    use reqwest::StatusCode;

    #[test]
    fn provider_error_envelope_is_unwrapped() {
        let body = r#"{"error":{"message":"invalid model"}}"#;
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, body),
            "invalid model"
        );
    }

    #[test]
    fn non_json_body_is_preserved_verbatim() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "upstream exploded"),
            "upstream exploded"
        );
    }

    #[test]
    fn empty_body_falls_back_to_canonical_reason() {
        assert_eq!(
            parse_error_message(StatusCode::NOT_FOUND, ""),
            "Not Found"
        );
    }

    #[test]
    fn envelope_without_message_falls_back_to_body() {
        let body = r#"{"error":{}}"#;
        assert_eq!(parse_error_message(StatusCode::BAD_REQUEST, body), body);
    }
}
