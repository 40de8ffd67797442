use crate::mode::Mode;

/// Default provider root when no base URL override is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Resolve the full endpoint URL for a given API surface.
///
/// Resolution rules:
/// 1) blank/absent override falls back to [`DEFAULT_BASE_URL`]
/// 2) trailing slashes are stripped before joining
/// 3) `Mode::Chat` appends `/chat/completions`, `Mode::Responses` appends
///    `/responses`
#[must_use]
pub fn endpoint_for(mode: Mode, base_url: Option<&str>) -> String {
    let base = base_url
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);

    let root = base.trim_end_matches('/');
    match mode {
        Mode::Chat => format!("{root}/chat/completions"),
        Mode::Responses => format!("{root}/responses"),
    }
}

#[cfg(test)]
mod tests {
    use super::{endpoint_for, DEFAULT_BASE_URL};
    use crate::mode::Mode;

    #[test]
    fn default_root_used_when_override_absent_or_blank() {
        assert_eq!(
            endpoint_for(Mode::Responses, None),
            format!("{DEFAULT_BASE_URL}/responses")
        );
        assert_eq!(
            endpoint_for(Mode::Chat, Some("   ")),
            format!("{DEFAULT_BASE_URL}/chat/completions")
        );
    }

    #[test]
    fn trailing_slash_never_produces_double_slash() {
        let url = endpoint_for(Mode::Responses, Some("https://example.com/v1/"));
        assert_eq!(url, "https://example.com/v1/responses");
        assert!(!url.contains("//responses"));

        let url = endpoint_for(Mode::Chat, Some("https://example.com/v1//"));
        assert_eq!(url, "https://example.com/v1/chat/completions");
    }

    #[test]
    fn suffix_matches_mode() {
        assert!(endpoint_for(Mode::Responses, Some("https://x.test")).ends_with("/responses"));
        assert!(endpoint_for(Mode::Chat, Some("https://x.test")).ends_with("/chat/completions"));
    }
}
