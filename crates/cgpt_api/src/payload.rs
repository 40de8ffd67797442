use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// One conversation turn in a chat-completions request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request payload for either API surface.
///
/// Exactly one of `input` (responses) or `messages` (chat) is populated,
/// selected by the [`Mode`] passed to [`RequestPayload::new`]. The prompt is
/// carried verbatim; an empty prompt is legal and passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,
    /// Included in the wire payload only when true.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RequestPayload {
    pub fn new(
        mode: Mode,
        model: impl Into<String>,
        prompt: impl Into<String>,
        stream: bool,
    ) -> Self {
        let prompt = prompt.into();
        let (input, messages) = match mode {
            Mode::Responses => (Some(prompt), None),
            Mode::Chat => (None, Some(vec![ChatMessage::user(prompt)])),
        };
        Self {
            model: model.into(),
            input,
            messages,
            stream,
        }
    }

    /// Copy of this payload with the streaming flag forced to `streaming`.
    #[must_use]
    pub fn with_stream(&self, streaming: bool) -> Self {
        let mut payload = self.clone();
        payload.stream = streaming;
        payload
    }
}
