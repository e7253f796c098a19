//! Line-oriented parsing of the assembled model output
//!
//! The model is instructed to answer as `Label: value` lines. Real outputs
//! wrap labels in markdown bullets or bold, so labels are matched after
//! stripping that decoration, case-insensitively.

use thiserror::Error;

use super::InvoiceRecord;

#[derive(Debug, Error)]
pub enum InvoiceParseError {
    /// The text contained none of the expected `Label: value` lines
    #[error("no invoice fields recognized in model output")]
    NoFields,
}

/// Parse the assembled response text into an [`InvoiceRecord`].
///
/// Unrecognized lines are ignored. Fails only when not a single expected
/// label is present, which the retry loop treats like a transport failure.
pub fn parse_invoice(text: &str) -> Result<InvoiceRecord, InvoiceParseError> {
    let mut record = InvoiceRecord::default();
    let mut recognized = 0usize;

    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = canonical_label(label);
        let Some(slot) = field_slot(&mut record, &label) else {
            continue;
        };
        recognized += 1;
        if let Some(value) = clean_value(value) {
            *slot = Some(value);
        }
    }

    if recognized == 0 {
        return Err(InvoiceParseError::NoFields);
    }
    Ok(record)
}

/// Lowercase the label and drop bullet/bold decoration around it.
fn canonical_label(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['-', '*', '•', ' '])
        .trim_end_matches('*')
        .trim()
        .to_ascii_lowercase()
}

/// Trim the value and map the "not available" sentinel to `None`.
fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('*').trim();
    if value.is_empty()
        || value.eq_ignore_ascii_case("not available")
        || value.eq_ignore_ascii_case("n/a")
    {
        return None;
    }
    Some(value.to_string())
}

fn field_slot<'a>(record: &'a mut InvoiceRecord, label: &str) -> Option<&'a mut Option<String>> {
    let slot = match label {
        "invoice number" => &mut record.invoice_number,
        "invoice date" => &mut record.invoice_date,
        "invoice amount" => &mut record.invoice_amount,
        "currency" => &mut record.currency,
        "legal entity name" => &mut record.legal_entity_name,
        "legal entity address" => &mut record.legal_entity_address,
        "vendor name" => &mut record.vendor_name,
        "vendor address" => &mut record.vendor_address,
        "payment terms" => &mut record.payment_terms,
        "payment method" => &mut record.payment_method,
        "vat id" => &mut record.vat_id,
        "gl account number" => &mut record.gl_account_number,
        "bank account number" => &mut record.bank_account_number,
        _ => return None,
    };
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "\
Invoice number: INV-2024-001
Invoice Date: 2024-03-15
Invoice Amount: 1,250.00
Currency: EUR
Legal Entity Name: Acme GmbH
Legal Entity Address: Hauptstr. 1, Berlin
Vendor Name: Papier AG
Vendor Address: not available
Payment Terms: Net 30
Payment Method: Bank transfer
VAT ID: DE123456789
GL Account Number: not available
Bank Account Number: DE89370400440532013000";

    #[test]
    fn parses_full_response() {
        let record = parse_invoice(FULL_RESPONSE).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("INV-2024-001"));
        assert_eq!(record.currency.as_deref(), Some("EUR"));
        assert_eq!(record.vendor_address, None);
        assert_eq!(record.gl_account_number, None);
        assert_eq!(record.populated_fields(), 11);
    }

    #[test]
    fn tolerates_markdown_decoration() {
        let record = parse_invoice("- **Invoice number:** INV-7\n* Currency: USD").unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("INV-7"));
        assert_eq!(record.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn label_match_is_case_insensitive() {
        let record = parse_invoice("INVOICE NUMBER: 42").unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("42"));
    }

    #[test]
    fn value_keeps_embedded_colons() {
        let record = parse_invoice("Invoice Date: 2024-03-15 10:30").unwrap();
        assert_eq!(record.invoice_date.as_deref(), Some("2024-03-15 10:30"));
    }

    #[test]
    fn not_available_maps_to_none() {
        let record = parse_invoice("Invoice number: 1\nVAT ID: Not Available").unwrap();
        assert_eq!(record.vat_id, None);
    }

    #[test]
    fn unrecognizable_text_fails() {
        assert!(matches!(
            parse_invoice("The image shows a cat."),
            Err(InvoiceParseError::NoFields)
        ));
        assert!(matches!(
            parse_invoice(""),
            Err(InvoiceParseError::NoFields)
        ));
    }
}
