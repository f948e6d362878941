use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::db::PersistenceError;
use crate::models::{ScreenType, TemplateRecord};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Row-level view of a stored template, without the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTemplateSummary {
    pub id: String,
    pub name: String,
    pub screen_type: ScreenType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert a template or fully replace the row sharing its id.
///
/// Runs as one IMMEDIATE transaction: the existence check and the write see the
/// same snapshot, and a failure leaves the previous row untouched. Returns
/// `true` when a new row was created. `created_at` survives replacement.
pub fn upsert_template(conn: &Connection, template: &TemplateRecord) -> Result<bool, PersistenceError> {
    let template_json = serde_json::to_string(template)?;
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM templates WHERE id = ?1)",
        [&template.template_id],
        |row| row.get(0),
    )?;

    tx.execute(
        "INSERT INTO templates (id, name, screen_type, pattern, template_json, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           screen_type = excluded.screen_type,
           pattern = excluded.pattern,
           template_json = excluded.template_json,
           updated_at = excluded.updated_at",
        params![
            template.template_id,
            template.template_name,
            template.screen_type.as_str(),
            template.pattern,
            template_json,
            now,
        ],
    )
    .map_err(PersistenceError::from_write)?;

    tx.commit()?;
    Ok(!exists)
}

/// Load a stored template by id.
pub fn get_template(conn: &Connection, template_id: &str) -> Result<Option<TemplateRecord>, PersistenceError> {
    let json: Option<String> = conn
        .query_row(
            "SELECT template_json FROM templates WHERE id = ?1",
            [template_id],
            |row| row.get(0),
        )
        .optional()?;

    match json {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn count_templates(conn: &Connection) -> Result<i64, PersistenceError> {
    let count = conn.query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))?;
    Ok(count)
}

/// List stored templates, most recently updated first, optionally filtered by screen type.
pub fn list_templates(
    conn: &Connection,
    screen_type: Option<ScreenType>,
) -> Result<Vec<StoredTemplateSummary>, PersistenceError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, screen_type, created_at, updated_at
         FROM templates
         WHERE ?1 IS NULL OR screen_type = ?1
         ORDER BY updated_at DESC, id ASC",
    )?;
    let rows = stmt
        .query_map([screen_type.map(|s| s.as_str())], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, name, screen_type, created_at, updated_at)| -> Result<_, PersistenceError> {
            Ok(StoredTemplateSummary {
                id,
                name,
                screen_type: screen_type.parse()?,
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
            })
        })
        .collect()
}

fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_default()
}
