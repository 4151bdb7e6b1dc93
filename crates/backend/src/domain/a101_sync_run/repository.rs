use chrono::Utc;
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncRunId, SyncStatus};
use contracts::domain::a101_sync_run::log::DocumentResult;
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a101_sync_run")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub status: String,
    pub headline: Option<String>,
    pub error_message: Option<String>,
    pub warning_message: Option<String>,
    /// JSON array of per-document outcomes
    pub sync_log: String,
    pub sync_customers: bool,
    pub sync_suppliers: bool,
    pub sync_sales_invoices: bool,
    pub sync_purchase_invoices: bool,
    pub sync_sales_orders: bool,
    pub sync_items: bool,
    pub sync_si_up_to: Option<chrono::NaiveDate>,
    pub sync_pi_up_to: Option<chrono::NaiveDate>,
    pub sync_from_date: Option<chrono::NaiveDate>,
    pub customers: Option<String>,
    pub suppliers: Option<String>,
    pub sales_invoices: Option<String>,
    pub purchase_invoices: Option<String>,
    pub sync_datetime: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SyncRun {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: false,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let sync_log: Vec<DocumentResult> =
            serde_json::from_str(&m.sync_log).unwrap_or_default();

        SyncRun {
            base: BaseAggregate::with_metadata(SyncRunId(uuid), m.name, metadata),
            status: SyncStatus::parse(&m.status).unwrap_or(SyncStatus::Queued),
            headline: m.headline,
            error_message: m.error_message,
            warning_message: m.warning_message,
            sync_log,
            sync_customers: m.sync_customers,
            sync_suppliers: m.sync_suppliers,
            sync_sales_invoices: m.sync_sales_invoices,
            sync_purchase_invoices: m.sync_purchase_invoices,
            sync_sales_orders: m.sync_sales_orders,
            sync_items: m.sync_items,
            sync_si_up_to: m.sync_si_up_to,
            sync_pi_up_to: m.sync_pi_up_to,
            sync_from_date: m.sync_from_date,
            customers: m.customers,
            suppliers: m.suppliers,
            sales_invoices: m.sales_invoices,
            purchase_invoices: m.purchase_invoices,
            sync_datetime: m.sync_datetime,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn insert(run: &SyncRun) -> anyhow::Result<Uuid> {
    let uuid = run.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        name: Set(run.base.name.clone()),
        status: Set(run.status.as_str().to_string()),
        headline: Set(run.headline.clone()),
        error_message: Set(run.error_message.clone()),
        warning_message: Set(run.warning_message.clone()),
        sync_log: Set(serde_json::to_string(&run.sync_log)?),
        sync_customers: Set(run.sync_customers),
        sync_suppliers: Set(run.sync_suppliers),
        sync_sales_invoices: Set(run.sync_sales_invoices),
        sync_purchase_invoices: Set(run.sync_purchase_invoices),
        sync_sales_orders: Set(run.sync_sales_orders),
        sync_items: Set(run.sync_items),
        sync_si_up_to: Set(run.sync_si_up_to),
        sync_pi_up_to: Set(run.sync_pi_up_to),
        sync_from_date: Set(run.sync_from_date),
        customers: Set(run.customers.clone()),
        suppliers: Set(run.suppliers.clone()),
        sales_invoices: Set(run.sales_invoices.clone()),
        purchase_invoices: Set(run.purchase_invoices.clone()),
        sync_datetime: Set(run.sync_datetime),
        created_at: Set(Some(run.base.metadata.created_at)),
        updated_at: Set(Some(run.base.metadata.updated_at)),
        version: Set(run.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<SyncRun>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn list_all() -> anyhow::Result<Vec<SyncRun>> {
    let items = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

// Granular setters below mirror how run state is persisted: each field
// change is committed on its own, so an observer polling the run sees
// intermediate state while the job is still executing.

async fn set_column(id: Uuid, col: Column, value: sea_orm::Value) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(col, Expr::value(value))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn set_status(id: Uuid, status: SyncStatus) -> anyhow::Result<bool> {
    set_column(id, Column::Status, status.as_str().into()).await
}

pub async fn set_headline(id: Uuid, headline: Option<String>) -> anyhow::Result<bool> {
    set_column(id, Column::Headline, headline.into()).await
}

pub async fn set_error_message(id: Uuid, message: Option<String>) -> anyhow::Result<bool> {
    set_column(id, Column::ErrorMessage, message.into()).await
}

pub async fn set_warning_message(id: Uuid, message: Option<String>) -> anyhow::Result<bool> {
    set_column(id, Column::WarningMessage, message.into()).await
}

pub async fn set_sync_log(id: Uuid, log: &[DocumentResult]) -> anyhow::Result<bool> {
    set_column(id, Column::SyncLog, serde_json::to_string(log)?.into()).await
}

/// Overwrite the four per-entity range summaries at once
pub async fn set_ranges(id: Uuid, placeholder: &str) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::Customers, Expr::value(placeholder))
        .col_expr(Column::Suppliers, Expr::value(placeholder))
        .col_expr(Column::SalesInvoices, Expr::value(placeholder))
        .col_expr(Column::PurchaseInvoices, Expr::value(placeholder))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
