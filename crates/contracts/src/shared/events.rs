//! Realtime event contract
//!
//! The push transport itself lives outside this system; these types are the
//! wire shapes observers and the external synchronisation client consume.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which synchronisation pipeline an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Winbooks,
    Farandsoft,
}

impl Pipeline {
    pub fn progress_event(&self, payload: ProgressPayload) -> RealtimeEvent {
        match self {
            Pipeline::Winbooks => RealtimeEvent::WinbooksSyncProgress(payload),
            Pipeline::Farandsoft => RealtimeEvent::FarandsoftSyncProgress(payload),
        }
    }

    pub fn refresh_event(&self, payload: RefreshPayload) -> RealtimeEvent {
        match self {
            Pipeline::Winbooks => RealtimeEvent::WinbooksSyncRefresh(payload),
            Pipeline::Farandsoft => RealtimeEvent::FarandsoftSyncRefresh(payload),
        }
    }
}

/// One realtime event, tagged with its wire name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "message", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// Tells the external client which entity types to synchronise
    StartSync(StartSyncPayload),
    WinbooksSyncProgress(ProgressPayload),
    FarandsoftSyncProgress(ProgressPayload),
    WinbooksSyncRefresh(RefreshPayload),
    FarandsoftSyncRefresh(RefreshPayload),
}

impl RealtimeEvent {
    /// Run name the event concerns
    pub fn sync_doc_name(&self) -> &str {
        match self {
            RealtimeEvent::StartSync(p) => &p.sync_doc_name,
            RealtimeEvent::WinbooksSyncProgress(p)
            | RealtimeEvent::FarandsoftSyncProgress(p) => &p.sync_doc_name,
            RealtimeEvent::WinbooksSyncRefresh(p)
            | RealtimeEvent::FarandsoftSyncRefresh(p) => &p.sync_doc_name,
        }
    }
}

/// Run configuration published when a run starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StartSyncPayload {
    pub sync_doc_name: String,

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

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_si_up_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_pi_up_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_from_date: Option<NaiveDate>,
}

/// `{run, current, total, message}` progress tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressPayload {
    pub sync_doc_name: String,
    pub current: u32,
    pub total: u32,
    pub message: String,
}

/// Signals observers to re-fetch run state; carries no result data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshPayload {
    pub sync_doc_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_event_uses_pipeline_wire_name() {
        let event = Pipeline::Winbooks.progress_event(ProgressPayload {
            sync_doc_name: "Synchronisation on 01/01/2026 at 09:00".into(),
            current: 1,
            total: 6,
            message: "Starting synchronisation...".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "winbooks_sync_progress");
        assert_eq!(json["message"]["current"], 1);
        assert_eq!(json["message"]["total"], 6);
    }

    #[test]
    fn refresh_carries_only_the_run_name() {
        let event = Pipeline::Farandsoft.refresh_event(RefreshPayload {
            sync_doc_name: "run".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "farandsoft_sync_refresh");
        assert_eq!(
            json["message"],
            serde_json::json!({"sync_doc_name": "run"})
        );
    }
}
