//! Base64 payload normalization
//!
//! Browser-sourced captures arrive as data URLs with inconsistent padding;
//! the endpoint wants the bare, 4-aligned base64 body.

/// Normalize a raw base64 image payload: trim surrounding whitespace, drop a
/// `data:...;base64,` prefix if present, and pad with `=` to a 4-aligned
/// length.
///
/// Never fails; the payload is not validated as an actual image here.
pub fn normalize_base64(raw: &str) -> String {
    let trimmed = raw.trim();
    let body = match trimmed.find(',') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    let mut cleaned = body.to_string();
    while cleaned.len() % 4 != 0 {
        cleaned.push('=');
    }
    cleaned
}
