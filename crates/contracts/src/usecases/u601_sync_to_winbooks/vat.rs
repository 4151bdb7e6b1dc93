use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Invoice payload submitted for VAT enrichment. Mirrors what the external
/// client fetched from the ERP: the tax table plus, on newer documents, the
/// precomputed `vat_data` summary set at invoice save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePayload {
    pub doctype: String,
    pub name: String,

    /// JSON-encoded `VatComputation` cached on the invoice; preferred over
    /// recomputing when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_data: Option<String>,

    #[serde(default)]
    pub taxes: Vec<TaxLine>,
}

/// One line of an invoice's tax table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxLine {
    /// Tax-type label; only lines in the VAT family are considered
    pub tax_type: String,

    /// JSON map of item code -> `[rate, amount, base, vat_code]`.
    /// Malformed or absent detail contributes nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_wise_tax_detail: Option<String>,
}

/// Per-VAT-code subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatBreakupLine {
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub vat_base: Decimal,
}

/// Total VAT plus the per-code breakup, rounded to currency precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatComputation {
    pub total_vat_amount: Decimal,
    pub vat_code_breakup: BTreeMap<String, VatBreakupLine>,
}
