//! Streaming extraction client
//!
//! One public operation: stream an invoice image to the chat endpoint,
//! reassemble the streamed answer line by line, parse it into a record, and
//! retry the whole attempt on failure with linearly growing backoff.

use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::OllamaConfig;
use crate::encoding::normalize_base64;
use crate::error::ExtractError;
use crate::invoice::{self, InvoiceRecord};
use crate::ndjson::{strip_heading_markers, ChatChunk, NdjsonDecoder};
use crate::request::build_chat_body;
use crate::retry::IsRetryable;

/// Observer for incremental extraction progress.
///
/// Called with the full text accumulated so far, not the delta; each call
/// replaces the previous value. Calls happen synchronously as stream lines
/// arrive, zero or more times per attempt, and start over from scratch when
/// an attempt is retried.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, text: &str);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&str) + Send,
{
    fn on_progress(&mut self, text: &str) {
        self(text)
    }
}

/// Observer that ignores progress.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _text: &str) {}
}

/// Client for one Ollama-compatible vision endpoint.
///
/// Cheap to share: every call owns its own accumulation buffer and decoder
/// state, so concurrent invocations are fully independent.
pub struct VisionClient {
    http: reqwest::Client,
    config: OllamaConfig,
}

impl VisionClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Use a caller-provided HTTP client (pool, proxy, or timeout settings).
    pub fn with_http_client(http: reqwest::Client, config: OllamaConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Extract an invoice record from a base64-encoded image.
    pub async fn process_image(&self, raw_base64: &str) -> Result<InvoiceRecord, ExtractError> {
        self.process_image_with_progress(raw_base64, &mut NoProgress)
            .await
    }

    /// Extract an invoice record, reporting cumulative text after each
    /// streamed fragment.
    pub async fn process_image_with_progress(
        &self,
        raw_base64: &str,
        observer: &mut dyn ProgressObserver,
    ) -> Result<InvoiceRecord, ExtractError> {
        let image = normalize_base64(raw_base64);
        if image.is_empty() {
            return Err(ExtractError::EmptyImage);
        }

        let body = build_chat_body(&self.config, &image);
        debug!(
            model = %self.config.model,
            image_len = image.len(),
            "starting extraction"
        );

        let mut attempt = 1u32;
        loop {
            match self.run_attempt(&body, observer).await {
                Ok(record) => {
                    debug!(attempt, fields = record.populated_fields(), "extraction succeeded");
                    return Ok(record);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(attempt, error = %err, "extraction attempt failed");
                    if attempt >= self.config.retry.max_attempts {
                        return Err(ExtractError::RetriesExhausted {
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }
                    tokio::time::sleep(self.config.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One full request/stream/parse cycle. All accumulated text is local to
    /// the attempt and discarded on failure.
    async fn run_attempt(
        &self,
        body: &serde_json::Value,
        observer: &mut dyn ProgressObserver,
    ) -> Result<InvoiceRecord, ExtractError> {
        let text = self.stream_completion(body, observer).await?;
        Ok(invoice::parse_invoice(&text)?)
    }

    /// Issue the request and reassemble the streamed answer.
    async fn stream_completion(
        &self,
        body: &serde_json::Value,
        observer: &mut dyn ProgressObserver,
    ) -> Result<String, ExtractError> {
        let response = self
            .http
            .post(self.config.chat_url())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Status { status, body });
        }

        let mut decoder = NdjsonDecoder::new();
        let mut accumulated = String::new();
        let mut bytes_received = 0usize;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk?;
            bytes_received += chunk.len();
            for line in decoder.feed(&chunk) {
                ingest_line(&line, &mut accumulated, observer);
            }
        }
        // A final record without a trailing newline still counts
        if let Some(line) = decoder.finish() {
            ingest_line(&line, &mut accumulated, observer);
        }

        debug!(bytes_received, chars = accumulated.len(), "stream complete");

        if accumulated.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }
        Ok(accumulated)
    }
}

/// Fold one stream line into the accumulated text. Malformed lines are
/// skipped, never fatal: transport chunking does not guarantee that every
/// read ends on a record boundary.
fn ingest_line(line: &str, accumulated: &mut String, observer: &mut dyn ProgressObserver) {
    if line.trim().is_empty() {
        return;
    }
    match serde_json::from_str::<ChatChunk>(line) {
        Ok(chunk) => {
            if chunk.done {
                debug!("endpoint signalled end of generation");
            }
            if let Some(content) = chunk.message.and_then(|m| m.content) {
                if !content.is_empty() {
                    accumulated.push_str(&strip_heading_markers(&content));
                    observer.on_progress(accumulated);
                }
            }
        }
        Err(err) => {
            warn!(error = %err, raw = line, "skipping malformed stream line");
        }
    }
}
