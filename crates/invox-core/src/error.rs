//! Error taxonomy for the extraction pipeline

use reqwest::StatusCode;
use thiserror::Error;

use crate::invoice::InvoiceParseError;
use crate::retry::IsRetryable;

/// Failures surfaced by [`VisionClient`](crate::client::VisionClient).
///
/// Malformed stream lines are not represented here: they are logged and
/// skipped inside one attempt without failing it.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Connection-level failure before or during the stream
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The stream completed without any usable text
    #[error("no text was extracted from the image")]
    EmptyContent,

    /// The assembled text did not parse into an invoice record
    #[error(transparent)]
    InvoiceParse(#[from] InvoiceParseError),

    /// The image payload was empty after normalization
    #[error("image payload is empty after normalization")]
    EmptyImage,

    /// Terminal error after the retry budget is spent
    #[error("failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ExtractError>,
    },
}

impl IsRetryable for ExtractError {
    fn is_retryable(&self) -> bool {
        match self {
            ExtractError::Transport(_)
            | ExtractError::Status { .. }
            | ExtractError::EmptyContent
            | ExtractError::InvoiceParse(_) => true,
            // Retrying a deterministic input failure cannot succeed
            ExtractError::EmptyImage | ExtractError::RetriesExhausted { .. } => false,
        }
    }
}
