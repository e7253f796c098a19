//! Chat request construction
//!
//! Builds the `/api/chat` body for one extraction: the instruction template,
//! the image attachment, and generation options.

use serde_json::{json, Value};

use crate::config::OllamaConfig;

/// Instruction template sent with every extraction request.
pub const EXTRACTION_PROMPT: &str = "\
Analyze this invoice image and extract information in the following format:

Invoice number: [value]
Invoice Date: [value]
Invoice Amount: [value]
Currency: [value]
Legal Entity Name: [value]
Legal Entity Address: [value]
Vendor Name: [value]
Vendor Address: [value]
Payment Terms: [value]
Payment Method: [value]
VAT ID: [value]
GL Account Number: [value]
Bank Account Number: [value]

If any field is not found, write \"not available\" for that field.";

/// Build the streaming chat body for one normalized image payload.
pub fn build_chat_body(config: &OllamaConfig, image_base64: &str) -> Value {
    json!({
        "model": config.model,
        "messages": [{
            "role": "user",
            "content": EXTRACTION_PROMPT,
            "images": [image_base64],
        }],
        "stream": true,
        "options": {
            "temperature": config.temperature,
            "num_predict": config.max_output_tokens,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_model_image_and_stream_flag() {
        let config = OllamaConfig::default();
        let body = build_chat_body(&config, "aGVsbG8=");
        assert_eq!(body["model"], config.model.as_str());
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "user");
        let images = body["messages"][0]["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0], "aGVsbG8=");
    }

    #[test]
    fn generation_options_come_from_config() {
        let config = OllamaConfig {
            temperature: 0.7,
            max_output_tokens: 512,
            ..OllamaConfig::default()
        };
        let body = build_chat_body(&config, "x");
        assert_eq!(body["options"]["num_predict"], 512);
        let temperature = body["options"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn prompt_names_every_extracted_field() {
        for field in [
            "Invoice number",
            "Invoice Date",
            "Invoice Amount",
            "Currency",
            "Legal Entity Name",
            "Legal Entity Address",
            "Vendor Name",
            "Vendor Address",
            "Payment Terms",
            "Payment Method",
            "VAT ID",
            "GL Account Number",
            "Bank Account Number",
        ] {
            assert!(EXTRACTION_PROMPT.contains(field), "missing {field}");
        }
    }
}
