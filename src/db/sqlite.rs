use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing;

use super::PersistenceError;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve a connection string to a SQLite database file.
///
/// Accepts `sqlite://<path>`, `sqlite:<path>`, `file:<path>` or a bare path.
/// Any other `<scheme>://` is rejected.
pub fn parse_connection_string(conn_str: &str) -> Result<PathBuf, PersistenceError> {
    let trimmed = conn_str.trim();
    if trimmed.is_empty() {
        return Err(PersistenceError::MissingConnectionString);
    }

    let path = ["sqlite://", "sqlite:", "file:"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);

    if let Some((scheme, _)) = path.split_once("://") {
        return Err(PersistenceError::UnsupportedBackend(scheme.to_string()));
    }
    if path.is_empty() || path == ":memory:" {
        return Err(PersistenceError::UnsupportedBackend(trimmed.to_string()));
    }

    Ok(PathBuf::from(path))
}

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, PersistenceError> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, PersistenceError> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<(), PersistenceError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), PersistenceError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_templates.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| PersistenceError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, PersistenceError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // schema_version + templates
        assert_eq!(count_tables(&conn).unwrap(), 2);
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        assert!(run_migrations(&conn).is_ok());
    }

    #[test]
    fn file_database_reopens_without_remigrating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.db");
        drop(open_database(&path).unwrap());
        let conn = open_database(&path).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn connection_string_forms() {
        assert_eq!(parse_connection_string("sqlite:///tmp/t.db").unwrap(), PathBuf::from("/tmp/t.db"));
        assert_eq!(parse_connection_string("sqlite:data/t.db").unwrap(), PathBuf::from("data/t.db"));
        assert_eq!(parse_connection_string("file:t.db").unwrap(), PathBuf::from("t.db"));
        assert_eq!(parse_connection_string(" library/t.db ").unwrap(), PathBuf::from("library/t.db"));
    }

    #[test]
    fn empty_connection_string_is_missing() {
        assert!(matches!(
            parse_connection_string("  "),
            Err(PersistenceError::MissingConnectionString)
        ));
    }

    #[test]
    fn foreign_schemes_are_rejected() {
        match parse_connection_string("postgres://user@localhost/templates") {
            Err(PersistenceError::UnsupportedBackend(scheme)) => assert_eq!(scheme, "postgres"),
            other => panic!("expected UnsupportedBackend, got {other:?}"),
        }
        assert!(matches!(
            parse_connection_string("sqlite::memory:"),
            Err(PersistenceError::UnsupportedBackend(_))
        ));
    }
}
