//! VAT breakup of an invoice, per VAT code.
//!
//! Newer invoices carry the precomputed breakup in `vat_data`; older ones
//! are recomputed from the tax table. Accumulation runs in `Decimal` with
//! rounding applied only at the edges, so recomputing a rounded result is
//! a no-op.

use anyhow::Context;
use contracts::usecases::u601_sync_to_winbooks::vat::{
    InvoicePayload, TaxLine, VatBreakupLine, VatComputation,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Only tax lines in the VAT family count toward the breakup
const VAT_TAX_PREFIX: &str = "VAT";

const CURRENCY_DP: u32 = 2;

pub fn compute_vat(invoice: &InvoicePayload) -> anyhow::Result<VatComputation> {
    if let Some(raw) = invoice.vat_data.as_deref() {
        let cached: VatComputation = serde_json::from_str(raw).with_context(|| {
            format!("invalid vat_data on {} {}", invoice.doctype, invoice.name)
        })?;
        return Ok(cached);
    }
    Ok(compute_from_taxes(&invoice.taxes))
}

/// Per-item detail on a tax line: `[rate, amount, base, vat_code]`
type ItemTaxDetail = (Decimal, Decimal, Decimal, String);

struct Accumulated {
    rate: Decimal,
    amount: Decimal,
    base: Decimal,
}

fn compute_from_taxes(taxes: &[TaxLine]) -> VatComputation {
    let mut accumulated: BTreeMap<String, Accumulated> = BTreeMap::new();

    for line in taxes {
        if !line.tax_type.starts_with(VAT_TAX_PREFIX) {
            continue;
        }
        let Some(raw) = line.item_wise_tax_detail.as_deref() else {
            continue;
        };
        // Malformed detail contributes nothing, same as absent detail
        let Ok(detail) = serde_json::from_str::<BTreeMap<String, ItemTaxDetail>>(raw) else {
            continue;
        };

        for (_item, (rate, amount, base, code)) in detail {
            let entry = accumulated.entry(code).or_insert(Accumulated {
                rate,
                amount: Decimal::ZERO,
                base: Decimal::ZERO,
            });
            entry.rate = rate;
            entry.amount += amount;
            entry.base += base;
        }
    }

    let vat_code_breakup: BTreeMap<String, VatBreakupLine> = accumulated
        .into_iter()
        .map(|(code, acc)| {
            (
                code,
                VatBreakupLine {
                    vat_rate: acc.rate,
                    vat_amount: acc.amount.round_dp(CURRENCY_DP),
                    vat_base: acc.base.round_dp(CURRENCY_DP),
                },
            )
        })
        .collect();

    let total_vat_amount = vat_code_breakup
        .values()
        .map(|line| line.vat_amount)
        .sum::<Decimal>()
        .round_dp(CURRENCY_DP);

    VatComputation {
        total_vat_amount,
        vat_code_breakup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn invoice(taxes: Vec<TaxLine>) -> InvoicePayload {
        InvoicePayload {
            doctype: "Sales Invoice".into(),
            name: "SI-0001".into(),
            vat_data: None,
            taxes,
        }
    }

    fn vat_line(detail: &str) -> TaxLine {
        TaxLine {
            tax_type: "VAT 21%".into(),
            item_wise_tax_detail: Some(detail.to_string()),
        }
    }

    #[test]
    fn accumulates_per_vat_code_across_lines() {
        let invoice = invoice(vec![
            vat_line(r#"{"ITEM-A": [21.0, 10.50, 50.00, "V21"], "ITEM-B": [21.0, 2.10, 10.00, "V21"]}"#),
            vat_line(r#"{"ITEM-C": [6.0, 0.60, 10.00, "V06"]}"#),
        ]);
        let result = compute_vat(&invoice).unwrap();

        assert_eq!(result.total_vat_amount, d("13.20"));
        let v21 = &result.vat_code_breakup["V21"];
        assert_eq!(v21.vat_rate, d("21.0"));
        assert_eq!(v21.vat_amount, d("12.60"));
        assert_eq!(v21.vat_base, d("60.00"));
        assert_eq!(result.vat_code_breakup["V06"].vat_amount, d("0.60"));
    }

    #[test]
    fn non_vat_lines_and_malformed_detail_contribute_nothing() {
        let invoice = invoice(vec![
            TaxLine {
                tax_type: "Stamp Duty".into(),
                item_wise_tax_detail: Some(r#"{"ITEM-A": [5.0, 1.00, 20.00, "SD"]}"#.into()),
            },
            vat_line("not json"),
            TaxLine {
                tax_type: "VAT 21%".into(),
                item_wise_tax_detail: None,
            },
        ]);
        let result = compute_vat(&invoice).unwrap();
        assert_eq!(result.total_vat_amount, Decimal::ZERO);
        assert!(result.vat_code_breakup.is_empty());
    }

    #[test]
    fn rounding_applies_only_at_the_edges() {
        // Three thirds of a cent accumulate exactly before rounding
        let invoice = invoice(vec![vat_line(
            r#"{"A": [21.0, 0.333, 1.586, "V21"], "B": [21.0, 0.333, 1.586, "V21"], "C": [21.0, 0.334, 1.587, "V21"]}"#,
        )]);
        let result = compute_vat(&invoice).unwrap();
        let v21 = &result.vat_code_breakup["V21"];
        assert_eq!(v21.vat_amount, d("1.00"));
        assert_eq!(v21.vat_base, d("4.76"));
        assert_eq!(result.total_vat_amount, d("1.00"));
    }

    #[test]
    fn recomputing_a_rounded_result_is_idempotent() {
        let invoice = invoice(vec![vat_line(
            r#"{"A": [21.0, 10.505, 50.02, "V21"]}"#,
        )]);
        let first = compute_vat(&invoice).unwrap();
        let reencoded = InvoicePayload {
            vat_data: Some(serde_json::to_string(&first).unwrap()),
            ..invoice
        };
        let second = compute_vat(&reencoded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cached_vat_data_is_preferred_over_the_tax_table() {
        let cached = VatComputation {
            total_vat_amount: d("42.00"),
            vat_code_breakup: BTreeMap::new(),
        };
        let invoice = InvoicePayload {
            doctype: "Sales Invoice".into(),
            name: "SI-0001".into(),
            vat_data: Some(serde_json::to_string(&cached).unwrap()),
            taxes: vec![vat_line(r#"{"A": [21.0, 1.00, 5.00, "V21"]}"#)],
        };
        assert_eq!(compute_vat(&invoice).unwrap(), cached);
    }

    #[test]
    fn garbage_vat_data_is_an_error_not_a_fallback() {
        let invoice = InvoicePayload {
            doctype: "Sales Invoice".into(),
            name: "SI-0001".into(),
            vat_data: Some("{broken".into()),
            taxes: Vec::new(),
        };
        assert!(compute_vat(&invoice).is_err());
    }
}
