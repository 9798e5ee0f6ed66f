//! Connection pool: one write connection, several read connections.
//!
//! WAL mode keeps readers concurrent with the single writer. In-memory
//! databases are isolated per connection, so in-memory mode routes every
//! read through the writer.

mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use noema_core::errors::{NoemaResult, StorageError};

use pragmas::{apply_read_pragmas, apply_write_pragmas};

/// Default number of read connections.
const DEFAULT_POOL_SIZE: usize = 4;

/// Maximum number of read connections.
const MAX_POOL_SIZE: usize = 8;

pub(crate) fn sqlite_err(e: rusqlite::Error) -> noema_core::errors::NoemaError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
    .into()
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> noema_core::errors::NoemaError {
    StorageError::PoolPoisoned {
        message: e.to_string(),
    }
    .into()
}

/// The single write connection plus a round-robin read pool.
pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a pool for the given database file.
    pub fn open(path: &Path, pool_size: usize) -> NoemaResult<Self> {
        let writer = Connection::open(path).map_err(sqlite_err)?;
        apply_write_pragmas(&writer)?;

        let size = pool_size.clamp(1, MAX_POOL_SIZE);
        let mut readers = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(sqlite_err)?;
            apply_read_pragmas(&conn)?;
            readers.push(Mutex::new(conn));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            next_reader: AtomicUsize::new(0),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (for testing). All traffic goes through the
    /// writer because in-memory connections are isolated databases.
    pub fn open_in_memory() -> NoemaResult<Self> {
        let writer = Connection::open_in_memory().map_err(sqlite_err)?;
        apply_write_pragmas(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
            db_path: None,
        })
    }

    /// Execute a closure on the write connection.
    pub fn with_writer<F, T>(&self, f: F) -> NoemaResult<T>
    where
        F: FnOnce(&Connection) -> NoemaResult<T>,
    {
        let guard = self.writer.lock().map_err(lock_err)?;
        f(&guard)
    }

    /// Execute a closure on a read connection (round-robin), falling back
    /// to the writer when no read pool exists.
    pub fn with_reader<F, T>(&self, f: F) -> NoemaResult<T>
    where
        F: FnOnce(&Connection) -> NoemaResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }
        let idx = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let guard = self.readers[idx].lock().map_err(lock_err)?;
        f(&guard)
    }

    /// Number of read connections.
    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Default read pool size.
    pub fn default_size() -> usize {
        DEFAULT_POOL_SIZE
    }
}
