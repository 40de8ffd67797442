//! Transport-only client primitives for the hosted text-generation API.
//!
//! This crate owns request building, endpoint resolution, and response
//! parsing for the two supported API surfaces ("responses" and
//! "chat-completions"). It intentionally contains no credential storage and
//! no terminal UI coupling.
//!
//! Stream normalization turns the heterogeneous SSE/chunked body shapes of
//! both surfaces into a single ordered sequence of plain-text fragments via
//! [`StreamNormalizer`], with non-JSON diagnostic lines passed through
//! verbatim rather than dropped.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod headers;
pub mod mode;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::ApiClient;
pub use client::CancellationSignal;
pub use config::ApiConfig;
pub use error::ApiError;
pub use events::StreamEvent;
pub use extract::extract_text;
pub use mode::Mode;
pub use payload::RequestPayload;
pub use sse::StreamNormalizer;
pub use url::endpoint_for;
