use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    ensure_table(
        &conn,
        "a101_sync_run",
        r#"
            CREATE TABLE a101_sync_run (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Queued',
                headline TEXT,
                error_message TEXT,
                warning_message TEXT,
                sync_log TEXT NOT NULL DEFAULT '[]',
                sync_customers INTEGER NOT NULL DEFAULT 0,
                sync_suppliers INTEGER NOT NULL DEFAULT 0,
                sync_sales_invoices INTEGER NOT NULL DEFAULT 0,
                sync_purchase_invoices INTEGER NOT NULL DEFAULT 0,
                sync_sales_orders INTEGER NOT NULL DEFAULT 0,
                sync_items INTEGER NOT NULL DEFAULT 0,
                sync_si_up_to TEXT,
                sync_pi_up_to TEXT,
                sync_from_date TEXT,
                customers TEXT,
                suppliers TEXT,
                sales_invoices TEXT,
                purchase_invoices TEXT,
                sync_datetime TEXT,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
    )
    .await?;

    ensure_table(
        &conn,
        "a102_sync_stamp",
        r#"
            CREATE TABLE a102_sync_stamp (
                doctype TEXT NOT NULL,
                name TEXT NOT NULL,
                sync_date TEXT,
                PRIMARY KEY (doctype, name)
            );
        "#,
    )
    .await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("database already initialized"))?;
    Ok(())
}

async fn ensure_table(
    conn: &DatabaseConnection,
    table_name: &str,
    create_sql: &str,
) -> anyhow::Result<()> {
    let check_sql = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        table_name
    );
    let existing = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check_sql))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", table_name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN.get().expect("Database not initialized")
}
