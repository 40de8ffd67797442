use serde_json::Value;

use crate::events::StreamEvent;
use crate::mode::Mode;

/// Extract the reply text from a complete non-streaming JSON document.
///
/// Chat mode reads `choices[0].message.content` and returns it only when it
/// is a string; any missing or mismatched shape yields `None` rather than an
/// error. Responses mode reuses the streaming delta classification applied
/// to the whole document, which covers providers that return the terminal
/// event shape as the full body.
///
/// Dispatch is on [`Mode`]; callers that get `None` are expected to fall
/// back to rendering the full document so nothing is silently dropped.
#[must_use]
pub fn extract_text(mode: Mode, document: &Value) -> Option<String> {
    match mode {
        Mode::Chat => chat_message_content(document).map(str::to_owned),
        Mode::Responses => StreamEvent::classify(document).into_fragment(),
    }
}

fn chat_message_content(document: &Value) -> Option<&str> {
    document
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
