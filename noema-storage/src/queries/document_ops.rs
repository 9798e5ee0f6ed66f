//! Document and chunk rows.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use noema_core::errors::{NoemaResult, StorageError};
use noema_core::models::{Document, DocumentChunk, DocumentStatus};

use crate::pool::sqlite_err;

use super::{in_placeholders, parse_json, parse_ts};

const DOC_COLUMNS: &str = "id, domain_id, title, content_type, source, tags, metadata, status, \
                           chunk_count, created_at, updated_at";

const CHUNK_COLUMNS: &str = "id, document_id, content, start_pos, end_pos, metadata, created_at";

#[allow(clippy::type_complexity)]
fn read_doc_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    usize,
    String,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

#[allow(clippy::type_complexity)]
fn to_document(
    raw: (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        usize,
        String,
        String,
    ),
) -> NoemaResult<Document> {
    let (id, domain_id, title, content_type, source, tags, metadata, status, chunk_count, c, u) =
        raw;
    Ok(Document {
        id,
        domain_id,
        title,
        content_type,
        source,
        tags: serde_json::from_str(&tags).map_err(|e| StorageError::Serialization {
            message: format!("bad tags column: {e}"),
        })?,
        metadata: parse_json(&metadata)?,
        status: DocumentStatus::parse(&status).ok_or_else(|| StorageError::Serialization {
            message: format!("unknown document status {status:?}"),
        })?,
        chunk_count,
        created_at: parse_ts(&c)?,
        updated_at: parse_ts(&u)?,
    })
}

pub fn insert(conn: &Connection, doc: &Document) -> NoemaResult<()> {
    let tags = serde_json::to_string(&doc.tags).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })?;
    conn.execute(
        "INSERT INTO documents
         (id, domain_id, title, content_type, source, tags, metadata, status, chunk_count,
          created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            doc.id,
            doc.domain_id,
            doc.title,
            doc.content_type,
            doc.source,
            tags,
            doc.metadata.to_string(),
            doc.status.as_str(),
            doc.chunk_count,
            doc.created_at.to_rfc3339(),
            doc.updated_at.to_rfc3339(),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> NoemaResult<Option<Document>> {
    conn.query_row(
        &format!("SELECT {DOC_COLUMNS} FROM documents WHERE id = ?1"),
        params![id],
        read_doc_row,
    )
    .optional()
    .map_err(sqlite_err)?
    .map(to_document)
    .transpose()
}

pub fn update(conn: &Connection, doc: &Document) -> NoemaResult<()> {
    let tags = serde_json::to_string(&doc.tags).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })?;
    let changed = conn
        .execute(
            "UPDATE documents SET title = ?2, content_type = ?3, source = ?4, tags = ?5,
             metadata = ?6, status = ?7, chunk_count = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                doc.id,
                doc.title,
                doc.content_type,
                doc.source,
                tags,
                doc.metadata.to_string(),
                doc.status.as_str(),
                doc.chunk_count,
                doc.updated_at.to_rfc3339(),
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(StorageError::RowNotFound {
            table: "documents".into(),
            id: doc.id.clone(),
        }
        .into());
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: &str) -> NoemaResult<()> {
    let changed = conn
        .execute("DELETE FROM documents WHERE id = ?1", params![id])
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(StorageError::RowNotFound {
            table: "documents".into(),
            id: id.into(),
        }
        .into());
    }
    Ok(())
}

pub fn list_by_domain(
    conn: &Connection,
    domain_id: &str,
    offset: usize,
    limit: usize,
) -> NoemaResult<Vec<Document>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {DOC_COLUMNS} FROM documents WHERE domain_id = ?1
             ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![domain_id, limit, offset], read_doc_row)
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(to_document).collect()
}

pub fn get_by_ids(conn: &Connection, ids: &[String]) -> NoemaResult<Vec<Document>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {DOC_COLUMNS} FROM documents WHERE id IN ({})",
        in_placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), read_doc_row)
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(to_document).collect()
}

// --- Chunks ---

type RawChunkRow = (String, String, String, usize, usize, String, String);

fn read_chunk_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawChunkRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn to_chunk(raw: RawChunkRow) -> NoemaResult<DocumentChunk> {
    let (id, document_id, content, start_pos, end_pos, metadata, created_at) = raw;
    Ok(DocumentChunk {
        id,
        document_id,
        content,
        start_pos,
        end_pos,
        metadata: parse_json(&metadata)?,
        created_at: parse_ts(&created_at)?,
    })
}

pub fn insert_chunks(conn: &Connection, chunks: &[DocumentChunk]) -> NoemaResult<()> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO document_chunks
             (id, document_id, content, start_pos, end_pos, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_err)?;
    for chunk in chunks {
        stmt.execute(params![
            chunk.id,
            chunk.document_id,
            chunk.content,
            chunk.start_pos,
            chunk.end_pos,
            chunk.metadata.to_string(),
            chunk.created_at.to_rfc3339(),
        ])
        .map_err(sqlite_err)?;
    }
    Ok(())
}

pub fn chunks_by_ids(conn: &Connection, ids: &[String]) -> NoemaResult<Vec<DocumentChunk>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {CHUNK_COLUMNS} FROM document_chunks WHERE id IN ({})",
        in_placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), read_chunk_row)
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(to_chunk).collect()
}

pub fn chunks_by_document(conn: &Connection, document_id: &str) -> NoemaResult<Vec<DocumentChunk>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {CHUNK_COLUMNS} FROM document_chunks WHERE document_id = ?1
             ORDER BY start_pos"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![document_id], read_chunk_row)
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(to_chunk).collect()
}

pub fn delete_chunks(conn: &Connection, document_id: &str) -> NoemaResult<()> {
    conn.execute(
        "DELETE FROM document_chunks WHERE document_id = ?1",
        params![document_id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}
