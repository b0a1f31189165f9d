//! Error types for the ETL run.
//!
//! Only [`StoreError::Connection`] and [`StoreError::Cursor`] abort a run.
//! Everything else is reported per file or per record and processing goes on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the warehouse store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unable to make a connection to the warehouse database at {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Unable to get a cursor to the warehouse database: {0:#}")]
    Cursor(anyhow::Error),

    #[error("Unable to reset the warehouse schema: {0:#}")]
    Schema(anyhow::Error),

    #[error("Unit of work failed during {stage}: {source}")]
    Transaction {
        stage: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// A single failed write against one table.
#[derive(Debug, Error)]
#[error("Unable to insert record into '{table}' table: {source}")]
pub struct WriteError {
    pub table: &'static str,
    #[source]
    pub source: rusqlite::Error,
}

/// The songplay lookup failed; callers treat this as "no match".
#[derive(Debug, Error)]
#[error("Unable to query for song ID and artist ID: {0}")]
pub struct LookupError(#[from] pub rusqlite::Error);

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("Path not found: {0:?}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("IO error while resolving {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The input file could not be read at all.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unable to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
