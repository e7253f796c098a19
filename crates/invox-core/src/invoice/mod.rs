//! Invoice record model and response parsing

mod parser;

pub use parser::{parse_invoice, InvoiceParseError};

use serde::{Deserialize, Serialize};

/// Structured fields extracted from one invoice image.
///
/// Every field is optional; "not available" in the model output maps to
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub invoice_amount: Option<String>,
    pub currency: Option<String>,
    pub legal_entity_name: Option<String>,
    pub legal_entity_address: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_address: Option<String>,
    pub payment_terms: Option<String>,
    pub payment_method: Option<String>,
    pub vat_id: Option<String>,
    pub gl_account_number: Option<String>,
    pub bank_account_number: Option<String>,
}

impl InvoiceRecord {
    /// Labeled fields in the order they appear in the extraction prompt.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 13] {
        [
            ("Invoice number", self.invoice_number.as_deref()),
            ("Invoice Date", self.invoice_date.as_deref()),
            ("Invoice Amount", self.invoice_amount.as_deref()),
            ("Currency", self.currency.as_deref()),
            ("Legal Entity Name", self.legal_entity_name.as_deref()),
            ("Legal Entity Address", self.legal_entity_address.as_deref()),
            ("Vendor Name", self.vendor_name.as_deref()),
            ("Vendor Address", self.vendor_address.as_deref()),
            ("Payment Terms", self.payment_terms.as_deref()),
            ("Payment Method", self.payment_method.as_deref()),
            ("VAT ID", self.vat_id.as_deref()),
            ("GL Account Number", self.gl_account_number.as_deref()),
            ("Bank Account Number", self.bank_account_number.as_deref()),
        ]
    }

    /// Number of fields the parser found a value for.
    pub fn populated_fields(&self) -> usize {
        self.fields().iter().filter(|(_, v)| v.is_some()).count()
    }
}
