//! Embedded schema migrations for the metadata store.
//!
//! Each migration is applied at most once, inside its own transaction, and
//! recorded in `schema_migrations`.

use sqlx::SqlitePool;
use tracing::{debug, info};

/// A single versioned migration script.
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("../../migrations/0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "add_client_id",
        sql: include_str!("../../migrations/0002_add_client_id.sql"),
    },
    Migration {
        version: 3,
        name: "add_summary",
        sql: include_str!("../../migrations/0003_add_summary.sql"),
    },
];

/// Apply every pending migration. Returns how many were applied.
pub async fn run_migrations(db: &SqlitePool) -> Result<usize, sqlx::Error> {
    run_migrations_up_to(db, i64::MAX).await
}

/// Apply pending migrations whose version is `<= target`.
pub async fn run_migrations_up_to(db: &SqlitePool, target: i64) -> Result<usize, sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(db)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(db)
        .await?;

    let mut count = 0;
    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version <= target && !applied.contains(&m.version))
    {
        let statements = split_statements(migration.sql);
        info!(
            "Applying migration {:04}_{} ({} statements)",
            migration.version,
            migration.name,
            statements.len()
        );

        let mut tx = db.begin().await?;
        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(&stmt).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        count += 1;
    }

    Ok(count)
}

/// Split a script on `;`, dropping `--` comment lines and empty statements.
fn split_statements(sql: &str) -> Vec<String> {
    let stripped = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    stripped
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
