//! Typed registry of synchronisable entity types
//!
//! Maps each entity type to the field list and default filters the external
//! client uses when fetching from the ERP. A closed enum resolved at compile
//! time; no runtime string dispatch.

use serde::{Deserialize, Serialize};

/// Entity types the bridge can synchronise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Customer,
    Supplier,
    SalesInvoice,
    PurchaseInvoice,
    SalesOrder,
    Item,
}

/// One default filter applied when fetching documents of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterRule {
    pub field: &'static str,
    pub op: FilterOp,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    /// Field has never been set (documents not yet stamped)
    IsNotSet,
}

const INVOICE_FILTERS: &[FilterRule] = &[
    FilterRule {
        field: "status",
        op: FilterOp::Ne,
        value: "Cancelled",
    },
    FilterRule {
        field: "status",
        op: FilterOp::Ne,
        value: "Draft",
    },
    FilterRule {
        field: "winbooks_sync_date",
        op: FilterOp::IsNotSet,
        value: "",
    },
];

const MASTER_FILTERS: &[FilterRule] = &[
    FilterRule {
        field: "disabled",
        op: FilterOp::Eq,
        value: "0",
    },
    FilterRule {
        field: "winbooks_sync_date",
        op: FilterOp::IsNotSet,
        value: "",
    },
];

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        EntityType::Customer,
        EntityType::Supplier,
        EntityType::SalesInvoice,
        EntityType::PurchaseInvoice,
        EntityType::SalesOrder,
        EntityType::Item,
    ];

    /// ERP document type name
    pub fn doctype(&self) -> &'static str {
        match self {
            EntityType::Customer => "Customer",
            EntityType::Supplier => "Supplier",
            EntityType::SalesInvoice => "Sales Invoice",
            EntityType::PurchaseInvoice => "Purchase Invoice",
            EntityType::SalesOrder => "Sales Order",
            EntityType::Item => "Item",
        }
    }

    pub fn from_doctype(s: &str) -> Option<Self> {
        EntityType::ALL.iter().copied().find(|e| e.doctype() == s)
    }

    /// Fields the external client fetches for this type
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Customer => &[
                "name",
                "customer_name",
                "tax_id",
                "territory",
                "default_currency",
                "disabled",
            ],
            EntityType::Supplier => &[
                "name",
                "supplier_name",
                "tax_id",
                "default_currency",
                "disabled",
            ],
            EntityType::SalesInvoice => &[
                "name",
                "customer",
                "posting_date",
                "due_date",
                "currency",
                "net_total",
                "grand_total",
                "status",
            ],
            EntityType::PurchaseInvoice => &[
                "name",
                "supplier",
                "posting_date",
                "due_date",
                "currency",
                "net_total",
                "grand_total",
                "status",
            ],
            EntityType::SalesOrder => &[
                "name",
                "customer",
                "transaction_date",
                "delivery_date",
                "grand_total",
                "status",
            ],
            EntityType::Item => &["name", "item_name", "item_group", "stock_uom", "disabled"],
        }
    }

    /// Default filter predicate: invoices exclude cancelled/draft documents,
    /// masters exclude disabled records; both skip already-stamped documents.
    pub fn default_filters(&self) -> &'static [FilterRule] {
        match self {
            EntityType::SalesInvoice | EntityType::PurchaseInvoice => INVOICE_FILTERS,
            _ => MASTER_FILTERS,
        }
    }
}
