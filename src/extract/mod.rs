//! Line-delimited JSON extraction.
//!
//! Each input file holds one JSON object per line. A line that fails to parse
//! is recorded as a [`ParseProblem`] and skipped, the rest of the file is
//! still extracted.

mod log;
mod song;

pub use log::{extract_log_file, LogEvent, NEXT_SONG_PAGE};
pub use song::{extract_song_file, SongLine};

use crate::error::ExtractError;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProblem {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

#[derive(Debug)]
pub struct Extracted<T> {
    pub records: Vec<T>,
    pub problems: Vec<ParseProblem>,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            problems: Vec::new(),
        }
    }
}

fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Extracted<T>, ExtractError> {
    let io_error = |source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_error)?);

    let mut extracted = Extracted::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => extracted.records.push(record),
            Err(err) => {
                warn!("Skipping malformed line {} of {:?}: {}", index + 1, path, err);
                extracted.problems.push(ParseProblem {
                    line: index + 1,
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(extracted)
}

/// Empty strings in the source data mean "unknown".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
