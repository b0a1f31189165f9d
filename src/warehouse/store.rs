//! SQLite-backed warehouse store.
//!
//! A [`Warehouse`] owns the single connection of a run. Writes go through a
//! [`UnitOfWork`], one transaction per input file.

use super::models::*;
use super::queries::{latest_query_set, QuerySet, WriteTemplate};
use super::schema::{
    latest_schema, TABLE_ARTISTS, TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIME, TABLE_USERS,
};
use super::trait_def::WarehouseWriter;
use crate::error::{LookupError, StoreError, WriteError};
use crate::sqlite_persistence::is_empty_database;
use anyhow::Context;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub struct Warehouse {
    conn: Connection,
    queries: &'static QuerySet,
    path: Option<PathBuf>,
}

impl Warehouse {
    /// Opens (creating if needed) the warehouse database at `db_path`.
    ///
    /// A brand new database gets the latest schema. An existing one must
    /// validate against it, and every statement of the query set must
    /// prepare, otherwise the store is not usable.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Connection {
            path: db_path.to_path_buf(),
            source,
        })?;
        info!("Opened warehouse database at {:?}", db_path);
        Self::from_connection(conn, Some(db_path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Connection {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        let queries = latest_query_set();
        prepare_session(&conn, queries).map_err(StoreError::Cursor)?;
        Ok(Warehouse {
            conn,
            queries,
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drops and recreates every warehouse table.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let schema = latest_schema();
        let tx = self.conn.transaction()?;
        schema
            .drop_all(&tx)
            .and_then(|_| schema.create(&tx))
            .map_err(StoreError::Schema)?;
        tx.commit()?;
        info!("Recreated warehouse schema at version {}", schema.version);
        Ok(())
    }

    /// Starts the unit of work for one input file.
    pub fn begin_unit(&mut self) -> Result<UnitOfWork<'_>, StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|source| StoreError::Transaction {
                stage: "begin",
                source,
            })?;
        Ok(UnitOfWork {
            tx,
            queries: self.queries,
            journal: Vec::new(),
            rollbacks: Vec::new(),
        })
    }

    pub fn table_counts(&self) -> Result<TableCounts, StoreError> {
        Ok(TableCounts {
            songs: self.count_rows(TABLE_SONGS)?,
            artists: self.count_rows(TABLE_ARTISTS)?,
            time: self.count_rows(TABLE_TIME)?,
            users: self.count_rows(TABLE_USERS)?,
            songplays: self.count_rows(TABLE_SONGPLAYS)?,
        })
    }

    fn count_rows(&self, table: &str) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count as usize)
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    ///
    /// Dropping a `Warehouse` also closes it, silently.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Query(e))
    }
}

fn prepare_session(conn: &Connection, queries: &QuerySet) -> anyhow::Result<()> {
    let schema = latest_schema();
    if is_empty_database(conn)? {
        info!("Creating warehouse schema at version {}", schema.version);
        schema.create(conn)?;
    } else {
        schema
            .validate(conn)
            .context("Warehouse schema validation failed")?;
    }

    conn.prepare_cached(queries.song_select)
        .context("Failed to prepare song lookup")?;
    for template in queries.write_templates() {
        conn.prepare_cached(template.sql)
            .with_context(|| format!("Failed to prepare write into '{}'", template.table))?;
    }
    debug!("Prepared query set version {}", queries.version);
    Ok(())
}

/// All writes of one input file, committed together.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls it
/// back.
///
/// Some failures (disk full, I/O errors, `RAISE(ROLLBACK)`) make SQLite roll
/// back the whole transaction, not only the failing statement. The unit keeps
/// a journal of its successful writes so it can reopen the transaction and
/// replay them. Each such event is kept as a [`UnitRollback`].
pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
    queries: &'static QuerySet,
    journal: Vec<(&'static WriteTemplate, Vec<Value>)>,
    rollbacks: Vec<UnitRollback>,
}

/// A failed write that took the whole transaction down with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRollback {
    /// Table of the write that caused the rollback.
    pub table: &'static str,
    /// Earlier writes of the unit written again after the rollback.
    pub replayed: usize,
    /// Earlier writes that failed on replay and are gone.
    pub lost: usize,
}

impl fmt::Display for UnitRollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unit of work rolled back by '{}' failure, {} writes replayed, {} lost",
            self.table, self.replayed, self.lost
        )
    }
}

impl UnitOfWork<'_> {
    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().map_err(|source| StoreError::Transaction {
            stage: "commit",
            source,
        })
    }

    pub fn rollbacks(&self) -> &[UnitRollback] {
        &self.rollbacks
    }

    fn execute(
        &mut self,
        template: &'static WriteTemplate,
        values: Vec<Value>,
    ) -> Result<(), WriteError> {
        match self.run(template, &values) {
            Ok(()) => {
                self.journal.push((template, values));
                Ok(())
            }
            Err(source) => {
                if self.tx.is_autocommit() {
                    self.recover(template.table);
                }
                Err(WriteError {
                    table: template.table,
                    source,
                })
            }
        }
    }

    fn run(&self, template: &WriteTemplate, values: &[Value]) -> rusqlite::Result<()> {
        self.tx
            .prepare_cached(template.sql)
            .and_then(|mut stmt| stmt.execute(params_from_iter(values)))
            .map(|_| ())
    }

    /// Reopens the transaction if SQLite closed it.
    fn reopen(&self) -> bool {
        if !self.tx.is_autocommit() {
            return true;
        }
        match self.tx.execute_batch("BEGIN DEFERRED") {
            Ok(()) => true,
            Err(err) => {
                error!("Unable to reopen unit of work: {}", err);
                false
            }
        }
    }

    fn recover(&mut self, table: &'static str) {
        let journal = std::mem::take(&mut self.journal);
        warn!(
            "Unit of work rolled back by '{}' failure, replaying {} writes",
            table,
            journal.len()
        );

        let mut rollback = UnitRollback {
            table,
            replayed: 0,
            lost: 0,
        };
        for (template, values) in journal {
            if !self.reopen() {
                rollback.lost += 1;
                continue;
            }
            match self.run(template, &values) {
                Ok(()) => {
                    rollback.replayed += 1;
                    self.journal.push((template, values));
                }
                Err(err) => {
                    error!("Lost write into '{}' on replay: {}", template.table, err);
                    rollback.lost += 1;
                }
            }
        }
        self.reopen();
        self.rollbacks.push(rollback);
    }
}

impl WarehouseWriter for UnitOfWork<'_> {
    fn write_song(&mut self, song: &SongRecord) -> Result<(), WriteError> {
        let queries = self.queries;
        self.execute(
            &queries.song_insert,
            vec![
                song.song_id.clone().into(),
                song.title.clone().into(),
                song.artist_id.clone().into(),
                song.year.into(),
                song.duration.into(),
            ],
        )
    }

    fn write_artist(&mut self, artist: &ArtistRecord) -> Result<(), WriteError> {
        let queries = self.queries;
        self.execute(
            &queries.artist_insert,
            vec![
                artist.artist_id.clone().into(),
                artist.name.clone().into(),
                artist.location.clone().into(),
                artist.latitude.into(),
                artist.longitude.into(),
            ],
        )
    }

    fn write_time(&mut self, time: &TimeRecord) -> Result<(), WriteError> {
        let queries = self.queries;
        self.execute(
            &queries.time_insert,
            vec![
                format_start_time(&time.start_time).into(),
                time.hour.into(),
                time.day.into(),
                time.week.into(),
                time.month.into(),
                time.year.into(),
                time.weekday.into(),
            ],
        )
    }

    fn write_user(&mut self, user: &UserRecord) -> Result<(), WriteError> {
        let queries = self.queries;
        self.execute(
            &queries.user_upsert,
            vec![
                user.user_id.clone().into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.gender.clone().into(),
                user.level.clone().into(),
            ],
        )
    }

    fn find_song(&mut self, lookup: SongLookup<'_>) -> Result<Option<SongMatch>, LookupError> {
        let mut stmt = self.tx.prepare_cached(self.queries.song_select)?;
        let found = stmt
            .query_row(
                params![lookup.title, lookup.artist_name, lookup.duration],
                |row| {
                    Ok(SongMatch {
                        song_id: row.get(0)?,
                        artist_id: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    fn write_songplay(&mut self, songplay: &SongplayRecord) -> Result<(), WriteError> {
        let queries = self.queries;
        self.execute(
            &queries.songplay_insert,
            vec![
                format_start_time(&songplay.start_time).into(),
                songplay.user_id.clone().into(),
                songplay.level.clone().into(),
                songplay.song_id.clone().into(),
                songplay.artist_id.clone().into(),
                songplay.session_id.into(),
                songplay.location.clone().into(),
                songplay.user_agent.clone().into(),
            ],
        )
    }
}
