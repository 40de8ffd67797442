use serde_json::Value;

use crate::events::StreamEvent;

/// End-of-stream sentinel, distinct from any JSON event.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";

/// Outcome of normalizing one raw line from the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Plain-text fragment to emit, in wire order.
    Fragment(String),
    /// Blank separator or textless control event; nothing to emit.
    Skip,
    /// Termination sentinel; the stream is closed.
    Done,
}

/// Incremental normalizer for line-oriented streaming bodies.
///
/// Feeds arbitrary byte chunks, splits on newlines, and turns each complete
/// line into at most one text fragment. Buffers nothing beyond the line
/// currently being decoded; once the `[DONE]` sentinel is seen all further
/// input is ignored.
///
/// Raw bytes are buffered and only decoded per complete line: the transport
/// may split a chunk anywhere, including inside a multi-byte UTF-8 sequence.
#[derive(Debug, Default)]
pub struct StreamNormalizer {
    buffer: Vec<u8>,
    done: bool,
}

impl StreamNormalizer {
    /// Feed bytes into the normalizer and drain fragments for every complete
    /// line they finish.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut fragments = Vec::new();
        while let Some(split) = self.buffer.iter().position(|&byte| byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(0..=split).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);

            match normalize_line(&line) {
                LineOutcome::Fragment(text) => fragments.push(text),
                LineOutcome::Skip => {}
                LineOutcome::Done => {
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
            }
        }

        fragments
    }

    /// Flush a trailing line that arrived without a newline terminator.
    /// Input exhaustion is a clean end, identical to seeing the sentinel.
    pub fn finish(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&line);
        match normalize_line(&line) {
            LineOutcome::Fragment(text) => Some(text),
            LineOutcome::Done => {
                self.done = true;
                None
            }
            LineOutcome::Skip => None,
        }
    }

    /// True once the termination sentinel has been observed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Normalize a fully-buffered body in one shot.
    #[must_use]
    pub fn normalize_all(input: &str) -> Vec<String> {
        let mut normalizer = Self::default();
        let mut fragments = normalizer.feed(input.as_bytes());
        fragments.extend(normalizer.finish());
        fragments
    }
}

/// Normalize one raw line from the stream.
///
/// 1) blank lines (SSE frame separators) are skipped
/// 2) a leading `data:` marker and following whitespace are stripped;
///    otherwise the trimmed line is used verbatim
/// 3) the `[DONE]` sentinel closes the stream
/// 4) JSON decode failure degrades to raw pass-through so diagnostic lines
///    from providers/proxies are not silently lost
/// 5) decoded events are classified by [`StreamEvent::classify`]; events
///    with no textual payload are skipped
#[must_use]
pub fn normalize_line(line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Skip;
    }

    let payload = trimmed
        .strip_prefix(DATA_PREFIX)
        .map(str::trim_start)
        .unwrap_or(trimmed);

    if payload == DONE_SENTINEL {
        return LineOutcome::Done;
    }

    match serde_json::from_str::<Value>(payload) {
        Err(_) => LineOutcome::Fragment(payload.to_string()),
        Ok(value) => match StreamEvent::classify(&value).into_fragment() {
            Some(fragment) => LineOutcome::Fragment(fragment),
            None => LineOutcome::Skip,
        },
    }
}
