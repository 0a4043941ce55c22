/*
   Copyright (C) 2026 l5yth

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

//! SQLite connection opener.
//!
//! The schema version lives in `PRAGMA user_version`. Opening a database
//! written by a newer build is refused rather than silently downgraded.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::Connection;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "tether.db";

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: i32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ordered migrations; entry `i` upgrades `user_version` from `i` to `i + 1`.
const MIGRATIONS: [&str; SCHEMA_VERSION as usize] = [r#"
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    created_at INTEGER NOT NULL       -- epoch ms
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY,
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL       -- epoch ms
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, id);
"#];

/// Caller-owned handle to an open storage connection.
///
/// Clones share the same connection. Call [`Db::close`] once the UI run has
/// returned; any later use reports [`Error::StorageUnavailable`].
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Db {
    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the open connection.
    ///
    /// A closed handle is [`Error::StorageUnavailable`]; a failure inside
    /// `f` is [`Error::Backend`].
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let guard = self.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| Error::storage(&self.path, "connection closed"))?;
        f(conn).map_err(Error::Backend)
    }

    /// Whether [`Db::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Close the connection. Calling this more than once is a no-op.
    pub fn close(&self) -> Result<()> {
        let Some(conn) = self.lock().take() else {
            return Ok(());
        };
        conn.close()
            .map_err(|(_, e)| Error::storage(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "storage connection closed");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        // a poisoned lock only means another thread panicked mid-query; the
        // connection itself is still usable
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Open (creating if needed) the database under `data_dir`.
pub fn connect(cancel: &CancellationToken, data_dir: &Path) -> Result<Db> {
    if cancel.is_cancelled() {
        return Err(Error::storage(data_dir, "cancelled before connect"));
    }
    fs::create_dir_all(data_dir).map_err(|e| Error::storage(data_dir, e))?;

    let path = data_dir.join(DB_FILE_NAME);
    let conn = Connection::open(&path).map_err(|e| Error::storage(&path, e))?;
    configure(&conn).map_err(|e| Error::storage(&path, e))?;
    migrate(&conn, &path)?;

    tracing::info!(path = %path.display(), version = SCHEMA_VERSION, "storage connected");
    Ok(Db {
        path,
        conn: Arc::new(Mutex::new(Some(conn))),
    })
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // journal_mode returns a row, so it goes through query_row
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

fn migrate(conn: &Connection, path: &Path) -> Result<()> {
    let current: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| Error::storage(path, e))?;
    if current > SCHEMA_VERSION {
        return Err(Error::storage(
            path,
            format!("schema version {current} is newer than supported {SCHEMA_VERSION}"),
        ));
    }
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let next = idx as i32 + 1;
        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nPRAGMA user_version = {next};\nCOMMIT;"
        ))
        .map_err(|e| Error::storage(path, format!("migration to v{next} failed: {e}")))?;
        tracing::debug!(version = next, "applied storage migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_creates_directory_and_schema() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("nested").join("data");
        let db = connect(&CancellationToken::new(), &dir).expect("connect");
        assert!(dir.join(DB_FILE_NAME).is_file());
        let version: i32 = db
            .with_conn(|c| c.query_row("PRAGMA user_version", [], |r| r.get(0)))
            .expect("version");
        assert_eq!(version, SCHEMA_VERSION);
        let tables: i64 = db
            .with_conn(|c| {
                c.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('sessions', 'messages')",
                    [],
                    |r| r.get(0),
                )
            })
            .expect("tables");
        assert_eq!(tables, 2);
    }

    #[test]
    fn reconnect_is_idempotent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let first = connect(&CancellationToken::new(), tmp.path()).expect("first");
        first.close().expect("close");
        let second = connect(&CancellationToken::new(), tmp.path()).expect("second");
        assert!(!second.is_closed());
    }

    #[test]
    fn newer_schema_is_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        {
            let conn = Connection::open(tmp.path().join(DB_FILE_NAME)).expect("open");
            conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
                .expect("bump version");
        }
        let err = connect(&CancellationToken::new(), tmp.path()).expect_err("must fail");
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn corrupt_file_is_storage_unavailable() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // larger than one page so sqlite inspects the header instead of
        // treating the file as empty
        fs::write(tmp.path().join(DB_FILE_NAME), vec![b'x'; 8192]).expect("write junk");
        let err = connect(&CancellationToken::new(), tmp.path()).expect_err("must fail");
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn data_dir_that_is_a_file_is_storage_unavailable() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let file = tmp.path().join("occupied");
        fs::write(&file, b"x").expect("write");
        let err = connect(&CancellationToken::new(), &file).expect_err("must fail");
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn cancelled_token_short_circuits() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(connect(&cancel, tmp.path()).is_err());
        assert!(!tmp.path().join(DB_FILE_NAME).exists());
    }

    #[test]
    fn closed_handle_reports_storage_unavailable() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db = connect(&CancellationToken::new(), tmp.path()).expect("connect");
        let clone = db.clone();
        db.close().expect("close");
        db.close().expect("second close is a no-op");
        assert!(clone.is_closed());
        let err = clone
            .with_conn(|c| c.execute("SELECT 1", []))
            .expect_err("closed");
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        assert!(err.to_string().contains("connection closed"));
    }

    #[test]
    fn query_failures_on_open_handle_are_backend_errors() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db = connect(&CancellationToken::new(), tmp.path()).expect("connect");
        let err = db
            .with_conn(|c| {
                c.execute(
                    "INSERT INTO messages (session_id, role, content, created_at) VALUES (999, 'user', 'x', 0)",
                    [],
                )
            })
            .expect_err("foreign key");
        assert!(matches!(err, Error::Backend(_)));
        assert!(!db.is_closed());
    }
}
