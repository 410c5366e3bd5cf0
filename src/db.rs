use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};
use tokio::fs;

/// Open the shared store handle. Created once at startup and cloned into `AppState`.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Arbitrary key for the advisory lock that serializes concurrent migration runs.
const MIGRATION_LOCK_KEY: i64 = 0x504f_535f_4d49_4752;

/// Execute the SQL files in `migrations/` in filename order. Every file must be idempotent.
///
/// Runs inside one transaction holding an advisory lock, so replicas (or test
/// binaries) starting together apply the schema one at a time.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    let txn = conn.begin().await?;
    txn.execute(Statement::from_string(
        backend,
        format!("SELECT pg_advisory_xact_lock({MIGRATION_LOCK_KEY})"),
    ))
    .await?;

    for file in files {
        tracing::debug!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if is_blank(stmt) {
                continue;
            }
            txn.execute(Statement::from_string(backend, format!("{stmt};")))
                .await?;
        }
    }

    txn.commit().await?;
    Ok(())
}

fn is_blank(stmt: &str) -> bool {
    stmt.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}
