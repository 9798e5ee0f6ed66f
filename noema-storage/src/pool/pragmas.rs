//! Connection pragmas: WAL for writer/reader concurrency, foreign keys
//! on so cascades hold at the schema level.

use rusqlite::Connection;

use noema_core::errors::NoemaResult;

use super::sqlite_err;

pub(crate) fn apply_write_pragmas(conn: &Connection) -> NoemaResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(sqlite_err)
}

pub(crate) fn apply_read_pragmas(conn: &Connection) -> NoemaResult<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(sqlite_err)
}
