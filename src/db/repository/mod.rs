//! Repository layer — template persistence.

mod template;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::sqlite::{open_database, parse_connection_string};
use super::PersistenceError;
use crate::models::TemplateRecord;

pub use template::*;

/// Outcome of a successful [`TemplateStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// `false` when an existing template with the same id was replaced.
    pub created: bool,
}

/// Durable storage for converted templates, keyed by template id.
pub trait TemplateStore {
    /// Insert `template`, or replace the stored template with the same id.
    fn save(&self, template: &TemplateRecord) -> Result<SaveOutcome, PersistenceError>;

    fn get(&self, template_id: &str) -> Result<Option<TemplateRecord>, PersistenceError>;
}

/// SQLite-backed template store.
///
/// Holds only the database path. Every call opens its own connection, which is
/// released when the call returns, on success and on error alike.
#[derive(Debug, Clone)]
pub struct SqliteTemplateStore {
    path: PathBuf,
}

impl SqliteTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build a store from a connection string (see [`parse_connection_string`]).
    pub fn from_connection_string(conn_str: &str) -> Result<Self, PersistenceError> {
        parse_connection_string(conn_str).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a short-lived connection to the store.
    pub fn connect(&self) -> Result<Connection, PersistenceError> {
        open_database(&self.path)
    }
}

impl TemplateStore for SqliteTemplateStore {
    fn save(&self, template: &TemplateRecord) -> Result<SaveOutcome, PersistenceError> {
        let conn = self.connect()?;
        let created = upsert_template(&conn, template)?;
        tracing::info!(
            template_id = %template.template_id,
            name = %template.template_name,
            created,
            "Template saved"
        );
        Ok(SaveOutcome { created })
    }

    fn get(&self, template_id: &str) -> Result<Option<TemplateRecord>, PersistenceError> {
        let conn = self.connect()?;
        get_template(&conn, template_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;
    use crate::models::{CanvasSize, ScrapedRecord};
    use serde_json::json;

    fn converted(name: &str) -> TemplateRecord {
        let scraped = ScrapedRecord::from_value(json!({
            "id": "spotlight",
            "componentName": name,
            "sections": [{"id": "s0", "boundingBox": {"x": 0, "y": 0, "width": 1, "height": 0.5}}],
            "slots": [{"id": "slot-0", "type": "image", "role": "image",
                       "boundingBox": {"x": 0.25, "y": 0.25, "width": 0.5, "height": 0.5}}]
        }))
        .unwrap();
        convert(&scraped, None, CanvasSize::DEFAULT).unwrap()
    }

    #[test]
    fn save_then_save_again_keeps_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteTemplateStore::new(dir.path().join("templates.db"));
        let t = converted("Spotlight");

        assert_eq!(store.save(&t).unwrap(), SaveOutcome { created: true });
        assert_eq!(store.save(&t).unwrap(), SaveOutcome { created: false });

        let conn = store.connect().unwrap();
        assert_eq!(count_templates(&conn).unwrap(), 1);
        assert_eq!(store.get("spotlight").unwrap(), Some(t));
    }

    #[test]
    fn later_save_overwrites_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteTemplateStore::new(dir.path().join("templates.db"));
        let t1 = converted("Spotlight");
        let t2 = converted("Spotlight (dark)");

        store.save(&t1).unwrap();
        store.save(&t2).unwrap();
        assert_eq!(store.get("spotlight").unwrap(), Some(t2));
    }

    #[test]
    fn unreachable_database_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteTemplateStore::new(dir.path().join("missing-dir").join("templates.db"));
        assert!(matches!(store.save(&converted("X")), Err(PersistenceError::Sqlite(_))));
    }

    #[test]
    fn from_connection_string_resolves_path() {
        let store = SqliteTemplateStore::from_connection_string("sqlite://library/templates.db").unwrap();
        assert_eq!(store.path(), Path::new("library/templates.db"));
        assert!(SqliteTemplateStore::from_connection_string("").is_err());
    }
}
