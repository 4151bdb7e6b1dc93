use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, Set};

use crate::shared::data::db::get_connection;

/// One (doctype, name) pair that has been exported to the accounting
/// system, with the run's sync datetime.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a102_sync_stamp")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub doctype: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub sync_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn get(doctype: &str, name: &str) -> anyhow::Result<Option<Model>> {
    let result = Entity::find_by_id((doctype.to_string(), name.to_string()))
        .one(conn())
        .await?;
    Ok(result)
}

/// Stamp a document, overwriting an earlier stamp from a previous run
pub async fn upsert(
    doctype: &str,
    name: &str,
    sync_date: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    let existing = get(doctype, name).await?;
    if existing.is_some() {
        Entity::update_many()
            .col_expr(Column::SyncDate, Expr::value(sync_date))
            .filter(Column::Doctype.eq(doctype))
            .filter(Column::Name.eq(name))
            .exec(conn())
            .await?;
    } else {
        let active = ActiveModel {
            doctype: Set(doctype.to_string()),
            name: Set(name.to_string()),
            sync_date: Set(Some(sync_date)),
        };
        active.insert(conn()).await?;
    }
    Ok(())
}
