use rusqlite::Connection;

use crate::schema;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(schema::CREATE_SCHEMA_VERSION)?;

    let current = get_version(conn)?;

    if current < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn get_version(conn: &Connection) -> anyhow::Result<i64> {
    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_version(conn: &Connection, version: i64) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Migration v1: catalog, price and run-history tables.
fn migrate_v1(conn: &Connection) -> anyhow::Result<()> {
    tracing::info!("applying migration v1: initial schema");
    for stmt in &schema::ALL_TABLES[1..] {
        conn.execute_batch(stmt)?;
    }
    conn.execute_batch(schema::CREATE_INDEXES)?;
    set_version(conn, 1)?;
    Ok(())
}
