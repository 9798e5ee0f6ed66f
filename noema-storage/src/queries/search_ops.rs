//! Search log rows and the stats aggregation behind the observability
//! surface.

use rusqlite::{params, Connection};

use noema_core::errors::NoemaResult;
use noema_core::models::{SearchLog, SearchStats};

use crate::pool::sqlite_err;

/// How many distinct queries the stats surface reports.
const TOP_QUERY_COUNT: usize = 10;

pub fn insert(conn: &Connection, log: &SearchLog) -> NoemaResult<()> {
    conn.execute(
        "INSERT INTO search_logs
         (id, query_id, domain_id, user_id, query_text, options, total_hits,
          response_time_ms, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            log.id,
            log.query_id,
            log.domain_id,
            log.user_id,
            log.query_text,
            log.options.to_string(),
            log.total_hits,
            log.response_time_ms,
            log.created_at.to_rfc3339(),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn stats(conn: &Connection, domain_id: &str) -> NoemaResult<SearchStats> {
    let (total, avg_ms, zero_hits): (usize, f64, usize) = conn
        .query_row(
            "SELECT COUNT(*),
                    COALESCE(AVG(response_time_ms), 0.0),
                    COALESCE(SUM(CASE WHEN total_hits = 0 THEN 1 ELSE 0 END), 0)
             FROM search_logs WHERE domain_id = ?1",
            params![domain_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .map_err(sqlite_err)?;

    let mut stmt = conn
        .prepare(
            "SELECT query_text, COUNT(*) AS n FROM search_logs
             WHERE domain_id = ?1
             GROUP BY query_text ORDER BY n DESC, query_text LIMIT ?2",
        )
        .map_err(sqlite_err)?;
    let top_queries = stmt
        .query_map(params![domain_id, TOP_QUERY_COUNT], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
        })
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;

    Ok(SearchStats {
        total_searches: total,
        avg_response_time_ms: avg_ms,
        zero_result_rate: if total == 0 {
            0.0
        } else {
            zero_hits as f64 / total as f64
        },
        top_queries,
    })
}
