use serde_json::Value;

/// Classification of one decoded JSON event into the shapes that can carry
/// reply text, tried in fixed priority order by [`StreamEvent::classify`].
///
/// The order matters: the responses-style delta has the most specific
/// discriminator (`type` suffix), the chat-style `choices` shape could in
/// principle coexist with unrelated fields, and the flat `output_text`
/// fallback is the least specific and must not shadow the structured cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// `{"type": "...output_text.delta", "delta": "..."}`
    ResponsesDelta { delta: String },
    /// `{"choices": [{"delta": {"content": "..."}}]}`
    ChatDelta { content: String },
    /// `{"output_text": "..."}` cumulative/flat text field.
    FlatText { text: String },
    /// Well-formed event with no textual payload; not an error.
    NoMatch,
}

impl StreamEvent {
    /// Classify a decoded JSON value; first matching shape wins.
    #[must_use]
    pub fn classify(value: &Value) -> Self {
        if let Some(delta) = responses_delta(value) {
            return Self::ResponsesDelta {
                delta: delta.to_owned(),
            };
        }
        if let Some(content) = chat_delta(value) {
            return Self::ChatDelta {
                content: content.to_owned(),
            };
        }
        if let Some(text) = value.get("output_text").and_then(Value::as_str) {
            return Self::FlatText {
                text: text.to_owned(),
            };
        }
        Self::NoMatch
    }

    /// Text carried by this event, if any. An empty delta is still a valid
    /// fragment and yields `Some("")`.
    #[must_use]
    pub fn into_fragment(self) -> Option<String> {
        match self {
            Self::ResponsesDelta { delta } => Some(delta),
            Self::ChatDelta { content } => Some(content),
            Self::FlatText { text } => Some(text),
            Self::NoMatch => None,
        }
    }
}

fn responses_delta(value: &Value) -> Option<&str> {
    let event_type = value.get("type")?.as_str()?;
    if !event_type.ends_with("output_text.delta") {
        return None;
    }
    value.get("delta")?.as_str()
}

fn chat_delta(value: &Value) -> Option<&str> {
    value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
}
