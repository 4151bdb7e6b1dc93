use crate::domain::a101_sync_run::log::DocumentResult;
use crate::domain::common::{AggregateId, BaseAggregate};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of one synchronisation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncRunId(pub Uuid);

impl SyncRunId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for SyncRunId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SyncRunId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Status
// ============================================================================

/// Run status: `Queued -> InProgress -> {Success, Partial, Error}`.
/// `Error` may be re-entered from a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Queued,
    #[serde(rename = "In Progress")]
    InProgress,
    Success,
    Partial,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Queued => "Queued",
            SyncStatus::InProgress => "In Progress",
            SyncStatus::Success => "Success",
            SyncStatus::Partial => "Partial",
            SyncStatus::Error => "Error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Queued" => Some(SyncStatus::Queued),
            "In Progress" => Some(SyncStatus::InProgress),
            "Success" => Some(SyncStatus::Success),
            "Partial" => Some(SyncStatus::Partial),
            "Error" => Some(SyncStatus::Error),
            _ => None,
        }
    }

    /// Terminal statuses are final; only `Error` allows a retry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncStatus::Success | SyncStatus::Partial | SyncStatus::Error
        )
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// One synchronisation run of the accounting bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    #[serde(flatten)]
    pub base: BaseAggregate<SyncRunId>,

    pub status: SyncStatus,

    /// Free-text summary shown at the top of the run page
    pub headline: Option<String>,
    pub error_message: Option<String>,
    pub warning_message: Option<String>,

    /// Per-document outcomes, in callback order
    pub sync_log: Vec<DocumentResult>,

    // Which entity types this run synchronises
    pub sync_customers: bool,
    pub sync_suppliers: bool,
    pub sync_sales_invoices: bool,
    pub sync_purchase_invoices: bool,
    pub sync_sales_orders: bool,
    pub sync_items: bool,

    // Date cutoffs forwarded to the external client
    pub sync_si_up_to: Option<NaiveDate>,
    pub sync_pi_up_to: Option<NaiveDate>,
    pub sync_from_date: Option<NaiveDate>,

    // Per-entity range summaries, filled by the external client and
    // cleared to a placeholder when a run aborts
    pub customers: Option<String>,
    pub suppliers: Option<String>,
    pub sales_invoices: Option<String>,
    pub purchase_invoices: Option<String>,

    /// Set at save time; stamped onto every synchronised document
    pub sync_datetime: Option<DateTime<Utc>>,
}

impl SyncRun {
    /// Create a new run for insertion, in `Queued` state.
    /// The name embeds the timestamp because the identity scheme has no
    /// time-pattern autonaming.
    pub fn new_for_insert(dto: SyncRunDto, now: DateTime<Utc>) -> Self {
        Self {
            base: BaseAggregate::new(SyncRunId::new_v4(), Self::display_name(now)),
            status: SyncStatus::Queued,
            headline: None,
            error_message: None,
            warning_message: None,
            sync_log: Vec::new(),
            sync_customers: dto.sync_customers,
            sync_suppliers: dto.sync_suppliers,
            sync_sales_invoices: dto.sync_sales_invoices,
            sync_purchase_invoices: dto.sync_purchase_invoices,
            sync_sales_orders: dto.sync_sales_orders,
            sync_items: dto.sync_items,
            sync_si_up_to: dto.sync_si_up_to,
            sync_pi_up_to: dto.sync_pi_up_to,
            sync_from_date: dto.sync_from_date,
            customers: None,
            suppliers: None,
            sales_invoices: None,
            purchase_invoices: None,
            sync_datetime: Some(now),
        }
    }

    /// "Synchronisation on 24/12/2025 at 16:45"
    pub fn display_name(at: DateTime<Utc>) -> String {
        format!(
            "Synchronisation on {} at {}",
            at.format("%d/%m/%Y"),
            at.format("%H:%M")
        )
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for creating a run from the UI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncRunDto {
    #[serde(default)]
    pub sync_customers: bool,
    #[serde(default)]
    pub sync_suppliers: bool,
    #[serde(default)]
    pub sync_sales_invoices: bool,
    #[serde(default)]
    pub sync_purchase_invoices: bool,
    #[serde(default)]
    pub sync_sales_orders: bool,
    #[serde(default)]
    pub sync_items: bool,
    pub sync_si_up_to: Option<NaiveDate>,
    pub sync_pi_up_to: Option<NaiveDate>,
    pub sync_from_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_name_embeds_date_and_time() {
        let at = Utc.with_ymd_and_hms(2025, 12, 24, 16, 45, 12).unwrap();
        assert_eq!(
            SyncRun::display_name(at),
            "Synchronisation on 24/12/2025 at 16:45"
        );
    }

    #[test]
    fn new_run_is_queued_with_sync_datetime() {
        let now = Utc::now();
        let run = SyncRun::new_for_insert(SyncRunDto::default(), now);
        assert_eq!(run.status, SyncStatus::Queued);
        assert_eq!(run.sync_datetime, Some(now));
        assert!(run.sync_log.is_empty());
    }

    #[test]
    fn status_round_trips_through_db_strings() {
        for status in [
            SyncStatus::Queued,
            SyncStatus::InProgress,
            SyncStatus::Success,
            SyncStatus::Partial,
            SyncStatus::Error,
        ] {
            assert_eq!(SyncStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SyncStatus::parse("Cancelled"), None);
    }
}
