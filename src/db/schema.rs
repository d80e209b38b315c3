//! Versioned schema for the jar table.
//!
//! Applied versions are recorded in `schema_migrations`. Each migration runs
//! in its own transaction together with its record, so a failed migration
//! leaves neither half behind.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "backfill_refresh_dates",
        sql: include_str!("migrations/002_backfill_refresh_dates.sql"),
    },
];

/// Version that describes the table as legacy databases created it.
const LEGACY_BASELINE: &str = "001";

/// Brings the schema up to date and returns the versions applied by this call.
pub fn run_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let mut applied = applied_versions(conn)?;
    if applied.is_empty() && has_jar_table(conn)? {
        let jars: i64 = conn.query_row("SELECT COUNT(*) FROM kombucha_jars", [], |row| row.get(0))?;
        record(conn, LEGACY_BASELINE, "initial")?;
        applied.insert(LEGACY_BASELINE.to_string());
        tracing::info!(
            "Found untracked jar table with {} jars, baselined at {}",
            jars,
            LEGACY_BASELINE
        );
    }

    let mut newly_applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(m.version)) {
        apply(conn, migration)?;
        newly_applied.push(migration.version);
    }
    Ok(newly_applied)
}

fn has_jar_table(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kombucha_jars'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn applied_versions(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<BTreeSet<String>>>()?;
    Ok(versions)
}

fn record(conn: &Connection, version: &str, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (version, name, chrono::Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!("Applying migration {}: {}", migration.version, migration.name);

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql).with_context(|| {
        format!(
            "Failed to apply migration {}: {}",
            migration.version, migration.name
        )
    })?;
    record(&tx, migration.version, migration.name)?;
    tx.commit()?;
    Ok(())
}
