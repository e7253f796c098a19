//! Newline-delimited JSON stream decoding
//!
//! The chat endpoint streams one JSON record per line, but transport chunks
//! need not align with line boundaries or even UTF-8 character boundaries.
//! The decoder carries both kinds of partial state across reads.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// One record of the streamed chat response.
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub done: bool,
}

/// Message body inside a chat record.
#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
}

static HEADING_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#+\s").expect("valid heading marker pattern"));

/// Strip markdown heading markers (`#` runs followed by whitespace) from a
/// content fragment.
pub fn strip_heading_markers(fragment: &str) -> String {
    HEADING_MARKERS.replace_all(fragment, "").into_owned()
}

/// Incremental decoder for newline-delimited JSON bodies.
///
/// Holds two pieces of state across reads: the bytes of an incomplete UTF-8
/// sequence at the end of the previous chunk, and the text of a line still
/// waiting for its newline.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    pending: Vec<u8>,
    partial_line: String,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning the complete lines it finished.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let text = self.drain_valid_utf8();
        self.split_lines(&text)
    }

    /// Drain the trailing unterminated line, if any. Bytes still pending at
    /// end of stream decode lossily.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.partial_line.push_str(&tail);
        }
        if self.partial_line.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.partial_line))
        }
    }

    /// Decode as much of the pending buffer as forms valid UTF-8, keeping an
    /// incomplete trailing sequence for the next read. Invalid sequences are
    /// replaced rather than aborting the stream.
    fn drain_valid_utf8(&mut self) -> String {
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
                    match err.error_len() {
                        // Incomplete sequence at the end; wait for more bytes
                        None => {
                            self.pending.drain(..valid_up_to);
                            return out;
                        }
                        // Invalid sequence mid-buffer; replace and move on
                        Some(len) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid_up_to + len);
                        }
                    }
                }
            }
        }
    }

    fn split_lines(&mut self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = text;
        while let Some(idx) = rest.find('\n') {
            let (head, tail) = rest.split_at(idx);
            self.partial_line.push_str(head);
            lines.push(std::mem::take(&mut self.partial_line));
            rest = &tail[1..];
        }
        self.partial_line.push_str(rest);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_in_one_chunk() {
        let mut decoder = NdjsonDecoder::new();
        let lines = decoder.feed(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn line_split_across_chunks() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.feed(b"{\"a\":").is_empty());
        let lines = decoder.feed(b"1}\n");
        assert_eq!(lines, vec!["{\"a\":1}"]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        // "é" is 0xC3 0xA9; split between its two bytes
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.feed(b"{\"t\":\"caf\xC3").is_empty());
        let lines = decoder.feed(b"\xA9\"}\n");
        assert_eq!(lines, vec!["{\"t\":\"café\"}"]);
    }

    #[test]
    fn invalid_byte_is_replaced_not_fatal() {
        let mut decoder = NdjsonDecoder::new();
        let lines = decoder.feed(b"a\xFFb\n");
        assert_eq!(lines, vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn finish_yields_unterminated_trailing_line() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.feed(b"{\"done\":true}").is_empty());
        assert_eq!(decoder.finish(), Some("{\"done\":true}".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn strips_heading_markers_anywhere_in_fragment() {
        assert_eq!(strip_heading_markers("## Invoice\ntext"), "Invoice\ntext");
        assert_eq!(strip_heading_markers("a # b"), "a b");
        assert_eq!(strip_heading_markers("#no-space"), "#no-space");
    }

    #[test]
    fn chunk_without_message_deserializes() {
        let chunk: ChatChunk = serde_json::from_str("{\"done\":true}").unwrap();
        assert!(chunk.message.is_none());
        assert!(chunk.done);
    }
}
