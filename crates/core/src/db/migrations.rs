//! Versioned schema migrations.
//!
//! Applied versions are recorded in `_migrations`. Each pending migration
//! runs inside its own transaction together with its version row, so a
//! failed batch leaves no partial schema behind.

use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::{Connection as RawConnection, params};

use crate::Error;
use crate::clock::to_db_timestamp;

/// Ordered migration list.
///
/// Statements use IF NOT EXISTS so a database that already holds one of the
/// tables still upgrades cleanly.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_notes.sql")),
    (2, include_str!("../../migrations/002_cache_entries.sql")),
];

/// Apply every migration newer than the recorded schema version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(apply_pending).await.map_err(Error::from)
}

fn apply_pending(conn: &mut RawConnection) -> Result<(), Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )?;

    let current: i64 = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

    for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
        tx.execute(
            "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, to_db_timestamp(chrono::Utc::now())],
        )?;
        tx.commit()?;
        tracing::debug!(version, "applied migration");
    }

    Ok(())
}
