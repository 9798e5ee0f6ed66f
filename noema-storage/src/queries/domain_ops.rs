//! Domain rows.

use rusqlite::{params, Connection, OptionalExtension};

use noema_core::errors::{NoemaResult, StorageError};
use noema_core::models::Domain;

use crate::pool::sqlite_err;

use super::parse_ts;

fn row_to_domain(
    id: String,
    name: String,
    description: String,
    config: String,
    created_at: String,
    updated_at: String,
) -> NoemaResult<Domain> {
    Ok(Domain {
        id,
        name,
        description,
        config: serde_json::from_str(&config).map_err(|e| StorageError::Serialization {
            message: format!("bad domain config: {e}"),
        })?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

type RawDomainRow = (String, String, String, String, String, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDomainRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

const COLUMNS: &str = "id, name, description, config, created_at, updated_at";

pub fn insert(conn: &Connection, domain: &Domain) -> NoemaResult<()> {
    let config = serde_json::to_string(&domain.config).map_err(|e| {
        StorageError::Serialization {
            message: e.to_string(),
        }
    })?;
    conn.execute(
        "INSERT INTO domains (id, name, description, config, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            domain.id,
            domain.name,
            domain.description,
            config,
            domain.created_at.to_rfc3339(),
            domain.updated_at.to_rfc3339(),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> NoemaResult<Option<Domain>> {
    let raw = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM domains WHERE id = ?1"),
            params![id],
            read_row,
        )
        .optional()
        .map_err(sqlite_err)?;
    raw.map(|(a, b, c, d, e, f)| row_to_domain(a, b, c, d, e, f))
        .transpose()
}

pub fn get_by_name(conn: &Connection, name: &str) -> NoemaResult<Option<Domain>> {
    let raw = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM domains WHERE name = ?1"),
            params![name],
            read_row,
        )
        .optional()
        .map_err(sqlite_err)?;
    raw.map(|(a, b, c, d, e, f)| row_to_domain(a, b, c, d, e, f))
        .transpose()
}

pub fn update(conn: &Connection, domain: &Domain) -> NoemaResult<()> {
    let config = serde_json::to_string(&domain.config).map_err(|e| {
        StorageError::Serialization {
            message: e.to_string(),
        }
    })?;
    let changed = conn
        .execute(
            "UPDATE domains SET name = ?2, description = ?3, config = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                domain.id,
                domain.name,
                domain.description,
                config,
                domain.updated_at.to_rfc3339(),
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(StorageError::RowNotFound {
            table: "domains".into(),
            id: domain.id.clone(),
        }
        .into());
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: &str) -> NoemaResult<()> {
    let changed = conn
        .execute("DELETE FROM domains WHERE id = ?1", params![id])
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(StorageError::RowNotFound {
            table: "domains".into(),
            id: id.into(),
        }
        .into());
    }
    Ok(())
}

pub fn list(conn: &Connection, offset: usize, limit: usize) -> NoemaResult<Vec<Domain>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM domains ORDER BY name LIMIT ?1 OFFSET ?2"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![limit, offset], read_row)
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter()
        .map(|(a, b, c, d, e, f)| row_to_domain(a, b, c, d, e, f))
        .collect()
}
