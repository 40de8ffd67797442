/// API surface selector: the "responses" endpoint or classic chat completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Responses,
    Chat,
}

impl Mode {
    /// Lenient parse: any token other than "chat" (case-insensitive) falls
    /// back to the default "responses" surface. This is a deliberate
    /// leniency policy, not validation.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("chat") {
            Self::Chat
        } else {
            Self::Responses
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Responses => "responses",
            Self::Chat => "chat",
        }
    }
}
