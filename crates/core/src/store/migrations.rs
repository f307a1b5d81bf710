//! Versioned schema migrations.
//!
//! `_migrations` records the highest applied version; anything above it is
//! applied in order on open.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Migration list: (version, SQL), strictly increasing by version.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_export_records.sql")),
    (2, include_str!("../../migrations/002_page_cache.sql")),
];

/// Apply every migration newer than the recorded schema version.
///
/// # Errors
///
/// A failing migration batch is reported as `MigrationFailed` with its version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, super::timestamp(chrono::Utc::now())],
            )?;
            tracing::debug!(version, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let tables: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type='table' AND name IN ('export_records', 'page_cache')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert_eq!(tables, 2);
    }

    #[tokio::test]
    async fn test_record_key_index_is_unique() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let unique: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT \"unique\" FROM pragma_index_list('export_records')
                     WHERE name = 'idx_export_records_key'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert!(unique);
    }

    #[tokio::test]
    async fn test_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let count: i64 = conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_versions_strictly_increase() {
        assert!(MIGRATIONS.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[tokio::test]
    async fn test_only_newer_versions_are_applied() {
        let conn = Connection::open_in_memory().await.unwrap();
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE _migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL);
                 INSERT INTO _migrations VALUES (1, '2024-01-01T00:00:00.000000Z');",
            )
        })
        .await
        .unwrap();

        run(&conn).await.unwrap();

        let tables: Vec<String> = conn
            .call(|conn| -> Result<Vec<String>, tokio_rusqlite::rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('export_records', 'page_cache')",
                )?;
                let names = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap();

        assert_eq!(tables, vec!["page_cache".to_string()]);
    }
}
