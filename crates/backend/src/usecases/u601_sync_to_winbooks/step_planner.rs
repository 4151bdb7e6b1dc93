//! Step budget for the progress bar of a Winbooks run.
//!
//! The total is fixed up front from the run's flags so the bar does not
//! jump around once the external client starts reporting.

use contracts::domain::a101_sync_run::aggregate::SyncRun;

/// Run setup plus the final import on the accounting side
pub const INITIAL_STEPS: u32 = 2;
/// Fetch from the ERP plus write to the import file, per document type
pub const DOCTYPE_STEPS: u32 = 2;

/// Total step count for the run's flag combination.
///
/// A master synchronised without its invoices costs double: the client
/// walks the full document list instead of only the ones referenced by
/// the invoice batch.
pub fn plan_total(run: &SyncRun) -> u32 {
    let mut total = INITIAL_STEPS;

    if run.sync_customers && !run.sync_sales_invoices {
        total += 2 * DOCTYPE_STEPS;
    } else if run.sync_customers {
        total += DOCTYPE_STEPS;
    }

    if run.sync_suppliers && !run.sync_purchase_invoices {
        total += 2 * DOCTYPE_STEPS;
    } else if run.sync_suppliers {
        total += DOCTYPE_STEPS;
    }

    if run.sync_sales_invoices {
        total += DOCTYPE_STEPS;
    }
    if run.sync_purchase_invoices {
        total += DOCTYPE_STEPS;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::domain::a101_sync_run::aggregate::SyncRunDto;

    fn run(customers: bool, suppliers: bool, si: bool, pi: bool) -> SyncRun {
        SyncRun::new_for_insert(
            SyncRunDto {
                sync_customers: customers,
                sync_suppliers: suppliers,
                sync_sales_invoices: si,
                sync_purchase_invoices: pi,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn customers_with_their_invoices() {
        assert_eq!(plan_total(&run(true, false, true, false)), 6);
    }

    #[test]
    fn customers_alone_cost_the_same_as_with_invoices() {
        assert_eq!(plan_total(&run(true, false, false, false)), 6);
    }

    #[test]
    fn all_four_flags() {
        assert_eq!(plan_total(&run(true, true, true, true)), 10);
    }

    #[test]
    fn nothing_selected_still_has_setup_steps() {
        assert_eq!(plan_total(&run(false, false, false, false)), 2);
    }

    #[test]
    fn invoices_without_their_master() {
        assert_eq!(plan_total(&run(false, false, true, true)), 6);
    }
}
