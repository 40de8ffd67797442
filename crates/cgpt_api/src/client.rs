use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{parse_error_message, ApiError};
use crate::headers::build_headers;
use crate::mode::Mode;
use crate::payload::RequestPayload;
use crate::sse::StreamNormalizer;
use crate::url::endpoint_for;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// HTTP executor for both API surfaces.
///
/// One logical call at a time; no shared mutable state between calls, so
/// independent concurrent calls need no locking.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client whose timeout bounds connection establishment only.
    /// Total stream duration is unbounded so long generations survive.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(ApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Endpoint URL for a surface, recomputed per call.
    #[must_use]
    pub fn endpoint(&self, mode: Mode) -> String {
        endpoint_for(mode, self.config.base_url.as_deref())
    }

    fn build_request(
        &self,
        mode: Mode,
        payload: &RequestPayload,
        streaming: bool,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let headers = build_headers(&self.config, streaming)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ApiError::InvalidHeader(key.clone()))?,
                HeaderValue::from_str(&value).map_err(|_| ApiError::InvalidHeader(key.clone()))?,
            );
        }

        let endpoint = self.endpoint(mode);
        debug!(%endpoint, streaming, "sending request");
        Ok(self
            .http
            .post(endpoint)
            .headers(out)
            .json(&payload.with_stream(streaming)))
    }

    async fn execute(
        &self,
        mode: Mode,
        payload: &RequestPayload,
        streaming: bool,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, ApiError> {
        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        let request = self.build_request(mode, payload, streaming)?;
        let response = await_or_cancel(request.send(), cancellation)
            .await?
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            return Err(ApiError::Status(status, parse_error_message(status, &body)));
        }

        Ok(response)
    }

    /// One-shot request; returns the complete JSON document.
    pub async fn send(
        &self,
        mode: Mode,
        payload: &RequestPayload,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Value, ApiError> {
        let response = self.execute(mode, payload, false, cancellation).await?;
        let document = await_or_cancel(response.json::<Value>(), cancellation)
            .await?
            .map_err(ApiError::from)?;
        Ok(document)
    }

    /// Streaming request; invokes `on_fragment` for each normalized text
    /// fragment in wire order.
    ///
    /// Cancellation is observed at every await point. Every exit path
    /// (sentinel, exhaustion, error, cancel) drops the response body and
    /// releases the connection.
    pub async fn stream_with_handler<F>(
        &self,
        mode: Mode,
        payload: &RequestPayload,
        cancellation: Option<&CancellationSignal>,
        mut on_fragment: F,
    ) -> Result<(), ApiError>
    where
        F: FnMut(&str),
    {
        let response = self.execute(mode, payload, true, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut normalizer = StreamNormalizer::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }
            let chunk = chunk.map_err(ApiError::from)?;
            for fragment in normalizer.feed(&chunk) {
                on_fragment(&fragment);
            }
            if normalizer.is_done() {
                break;
            }
        }

        if !normalizer.is_done() {
            if let Some(fragment) = normalizer.finish() {
                on_fragment(&fragment);
            }
        }

        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        debug!("stream finished");
        Ok(())
    }

    /// Streaming request collected into an ordered fragment list.
    pub async fn stream(
        &self,
        mode: Mode,
        payload: &RequestPayload,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Vec<String>, ApiError> {
        let mut fragments = Vec::new();
        self.stream_with_handler(mode, payload, cancellation, |fragment| {
            fragments.push(fragment.to_owned());
        })
        .await?;
        Ok(fragments)
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::{await_or_cancel, ApiClient};
    use crate::config::ApiConfig;
    use crate::error::ApiError;
    use crate::mode::Mode;

    #[test]
    fn endpoint_respects_configured_base_url() {
        let client = ApiClient::new(ApiConfig::new("k").with_base_url("https://example.com/v1/"))
            .expect("client should build");
        assert_eq!(client.endpoint(Mode::Chat), "https://example.com/v1/chat/completions");
        assert_eq!(client.endpoint(Mode::Responses), "https://example.com/v1/responses");
    }

    #[tokio::test]
    async fn await_or_cancel_returns_cancelled_for_set_signal() {
        let signal = Arc::new(AtomicBool::new(false));
        signal.store(true, Ordering::Release);

        let result = await_or_cancel(std::future::pending::<()>(), Some(&signal)).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn await_or_cancel_passes_output_through_without_signal() {
        let result = await_or_cancel(async { 7 }, None).await;
        assert!(matches!(result, Ok(7)));
    }
}
