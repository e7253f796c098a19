//! Core library for Invox - streaming invoice extraction.
//!
//! Streams an invoice image to an Ollama-compatible vision endpoint,
//! reassembles the newline-delimited JSON response incrementally, retries
//! transient failures with linear backoff, and parses the final text into a
//! structured [`InvoiceRecord`].

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod invoice;
pub mod ndjson;
pub mod request;
pub mod retry;

pub use client::{NoProgress, ProgressObserver, VisionClient};
pub use config::OllamaConfig;
pub use error::ExtractError;
pub use invoice::{InvoiceParseError, InvoiceRecord};
