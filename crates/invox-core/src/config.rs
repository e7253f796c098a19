//! Client configuration
//!
//! Endpoint, model, and generation settings travel with the client instead
//! of living in compiled-in constants, so tests can point at a mock server.

use crate::retry::RetryConfig;

/// Configuration for a [`VisionClient`](crate::client::VisionClient).
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server, e.g. `http://localhost:11434`
    pub base_url: String,
    /// Vision model to run
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Cap on generated tokens (sent as `num_predict`)
    pub max_output_tokens: u32,
    /// Retry bound and backoff unit for failed attempts
    pub retry: RetryConfig,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
            temperature: 0.3,
            max_output_tokens: 2048,
            retry: RetryConfig::default(),
        }
    }
}

impl OllamaConfig {
    /// Full URL of the streaming chat endpoint
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_tolerates_trailing_slash() {
        let config = OllamaConfig {
            base_url: "http://127.0.0.1:11434/".to_string(),
            ..OllamaConfig::default()
        };
        assert_eq!(config.chat_url(), "http://127.0.0.1:11434/api/chat");
    }
}
