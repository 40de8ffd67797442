use std::collections::BTreeMap;

use crate::config::ApiConfig;
use crate::error::ApiError;

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_ACCEPT: &str = "accept";

/// Build a deterministic header map for an API request.
///
/// A blank API key is rejected here, before any connection is opened.
pub fn build_headers(
    config: &ApiConfig,
    streaming: bool,
) -> Result<BTreeMap<String, String>, ApiError> {
    if config.api_key.trim().is_empty() {
        return Err(ApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        format!("Bearer {}", config.api_key.trim()),
    );
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );
    headers.insert(
        HEADER_ACCEPT.to_owned(),
        if streaming {
            "text/event-stream".to_owned()
        } else {
            "application/json".to_owned()
        },
    );

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::{build_headers, HEADER_ACCEPT, HEADER_AUTHORIZATION};
    use crate::config::ApiConfig;
    use crate::error::ApiError;

    #[test]
    fn bearer_token_is_trimmed() {
        let headers = build_headers(&ApiConfig::new("  sk-abc  "), false).unwrap();
        assert_eq!(
            headers.get(HEADER_AUTHORIZATION).map(String::as_str),
            Some("Bearer sk-abc")
        );
    }

    #[test]
    fn accept_header_follows_transfer_shape() {
        let streaming = build_headers(&ApiConfig::new("k"), true).unwrap();
        let blocking = build_headers(&ApiConfig::new("k"), false).unwrap();
        assert_eq!(
            streaming.get(HEADER_ACCEPT).map(String::as_str),
            Some("text/event-stream")
        );
        assert_eq!(
            blocking.get(HEADER_ACCEPT).map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let error = build_headers(&ApiConfig::new("   "), false).unwrap_err();
        assert!(matches!(error, ApiError::MissingApiKey));
    }
}
