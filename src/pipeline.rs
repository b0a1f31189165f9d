//! The ETL driver.
//!
//! For each category of input the driver discovers the files, then for every
//! file extracts, transforms and writes all its rows through one unit of
//! work, and commits. A failed write is logged and counted, it never stops
//! the file or the run.

use crate::config::AppConfig;
use crate::discover::discover_files;
use crate::error::{DiscoverError, WriteError};
use crate::extract::{extract_log_file, extract_song_file, ParseProblem};
use crate::transform::{
    playable_events, song_lookup, songplay_record, start_time, time_record, user_record,
};
use crate::warehouse::{
    NullWarehouseWriter, TableCounts, UnitRollback, Warehouse, WarehouseWriter, TABLE_ARTISTS,
    TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIME, TABLE_USERS,
};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Song,
    Log,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Song => "song",
            Category::Log => "log",
        }
    }

    /// Runs extraction, transformation and writes for a single file.
    pub fn process_file<W: WarehouseWriter>(&self, writer: &mut W, path: &Path) -> FileReport {
        match self {
            Category::Song => process_song_file(writer, path),
            Category::Log => process_log_file(writer, path),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub table: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableTally {
    pub attempted: usize,
    pub failed: usize,
}

/// Outcome of every write issued for one file.
#[derive(Debug, Default)]
pub struct WriteTally {
    pub tables: BTreeMap<&'static str, TableTally>,
    pub failures: Vec<WriteFailure>,
    /// Songplay lookups that errored and were treated as no match.
    pub lookup_failures: usize,
    /// Songplays written without song and artist ids.
    pub unmatched_songplays: usize,
    /// Events dropped because their timestamp is out of range.
    pub skipped_events: usize,
}

impl WriteTally {
    pub fn record(&mut self, table: &'static str, result: Result<(), WriteError>) {
        let tally = self.tables.entry(table).or_default();
        tally.attempted += 1;
        if let Err(err) = result {
            error!("{}", err);
            tally.failed += 1;
            self.failures.push(WriteFailure {
                table: err.table,
                message: err.source.to_string(),
            });
        }
    }

    pub fn attempted(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.attempted).unwrap_or(0)
    }

    pub fn failed(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.failed).unwrap_or(0)
    }

    pub fn total_failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Lines successfully parsed.
    pub records: usize,
    pub parse_problems: Vec<ParseProblem>,
    pub writes: WriteTally,
    /// Set when the file could not be read at all.
    pub extract_error: Option<String>,
    /// Set when the unit of work could not be started or committed.
    pub commit_error: Option<String>,
    /// Write failures that rolled back the unit of work before it was
    /// reopened and replayed.
    pub rollbacks: Vec<UnitRollback>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: 0,
            parse_problems: Vec::new(),
            writes: WriteTally::default(),
            extract_error: None,
            commit_error: None,
            rollbacks: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct CategoryReport {
    pub category: Category,
    pub root: PathBuf,
    pub files: Vec<FileReport>,
}

impl CategoryReport {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn parse_problems(&self) -> usize {
        self.files.iter().map(|f| f.parse_problems.len()).sum()
    }

    pub fn failed_writes(&self) -> usize {
        self.files.iter().map(|f| f.writes.total_failed()).sum()
    }

    pub fn unreadable_files(&self) -> usize {
        self.files.iter().filter(|f| f.extract_error.is_some()).count()
    }

    pub fn failed_commits(&self) -> usize {
        self.files.iter().filter(|f| f.commit_error.is_some()).count()
    }

    /// Writes lost to rolled back units of work that could not be replayed.
    pub fn lost_writes(&self) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.rollbacks)
            .map(|r| r.lost)
            .sum()
    }

    pub fn rolled_back_units(&self) -> usize {
        self.files.iter().map(|f| f.rollbacks.len()).sum()
    }
}

/// Inserts the songs and artists of one song data file.
pub fn process_song_file<W: WarehouseWriter>(writer: &mut W, path: &Path) -> FileReport {
    let mut report = FileReport::new(path);
    let extracted = match extract_song_file(path) {
        Ok(extracted) => extracted,
        Err(err) => {
            error!("{}", err);
            report.extract_error = Some(err.to_string());
            return report;
        }
    };
    report.records = extracted.records.len();
    report.parse_problems = extracted.problems;

    for line in extracted.records {
        let (song, artist) = line.split();
        report.writes.record(TABLE_SONGS, writer.write_song(&song));
        report.writes.record(TABLE_ARTISTS, writer.write_artist(&artist));
    }
    report
}

/// Inserts the time, user and songplay rows of one log data file.
pub fn process_log_file<W: WarehouseWriter>(writer: &mut W, path: &Path) -> FileReport {
    let mut report = FileReport::new(path);
    let extracted = match extract_log_file(path) {
        Ok(extracted) => extracted,
        Err(err) => {
            error!("{}", err);
            report.extract_error = Some(err.to_string());
            return report;
        }
    };
    report.records = extracted.records.len();
    report.parse_problems = extracted.problems;

    let mut events = Vec::new();
    for event in playable_events(extracted.records) {
        match start_time(event.ts) {
            Some(start_time) => events.push((event, start_time)),
            None => {
                warn!("Skipping event with out of range timestamp {} in {:?}", event.ts, path);
                report.writes.skipped_events += 1;
            }
        }
    }

    for (_, start_time) in &events {
        report
            .writes
            .record(TABLE_TIME, writer.write_time(&time_record(*start_time)));
    }

    for (event, _) in &events {
        report
            .writes
            .record(TABLE_USERS, writer.write_user(&user_record(event)));
    }

    for (event, start_time) in &events {
        let found = match song_lookup(event) {
            Some(lookup) => match writer.find_song(lookup) {
                Ok(found) => found,
                Err(err) => {
                    error!("{}", err);
                    report.writes.lookup_failures += 1;
                    None
                }
            },
            None => None,
        };

        let mut songplay = songplay_record(event, *start_time);
        match found {
            Some(found) => {
                songplay.song_id = Some(found.song_id);
                songplay.artist_id = Some(found.artist_id);
            }
            None => report.writes.unmatched_songplays += 1,
        }
        report
            .writes
            .record(TABLE_SONGPLAYS, writer.write_songplay(&songplay));
    }
    report
}

/// Processes every file of one category found under `root`, committing after
/// each file.
pub fn process_data(
    warehouse: &mut Warehouse,
    root: &Path,
    extension: &str,
    category: Category,
) -> Result<CategoryReport, DiscoverError> {
    let discovered = discover_files(root, extension)?;
    let total = discovered.total();
    info!("{} files found in {}", total, root.display());

    let mut files = Vec::with_capacity(total);
    for (index, path) in discovered.files.iter().enumerate() {
        let report = match warehouse.begin_unit() {
            Ok(mut unit) => {
                let mut report = category.process_file(&mut unit, path);
                for rollback in unit.rollbacks() {
                    warn!("{:?}: {}", path, rollback);
                }
                report.rollbacks = unit.rollbacks().to_vec();
                if let Err(err) = unit.commit() {
                    error!("Failed to commit {:?}: {}", path, err);
                    report.commit_error = Some(err.to_string());
                }
                report
            }
            Err(err) => {
                error!("Failed to start unit of work for {:?}: {}", path, err);
                let mut report = FileReport::new(path);
                report.commit_error = Some(err.to_string());
                report
            }
        };
        files.push(report);
        info!("{}/{} files processed.", index + 1, total);
    }

    Ok(CategoryReport {
        category,
        root: discovered.root,
        files,
    })
}

/// Like [`process_data`] but without a warehouse: files are parsed and
/// transformed, nothing is written.
pub fn inspect_data(
    root: &Path,
    extension: &str,
    category: Category,
) -> Result<CategoryReport, DiscoverError> {
    let discovered = discover_files(root, extension)?;
    let total = discovered.total();
    info!("{} files found in {}", total, root.display());

    let mut writer = NullWarehouseWriter;
    let mut files = Vec::with_capacity(total);
    for (index, path) in discovered.files.iter().enumerate() {
        files.push(category.process_file(&mut writer, path));
        info!("{}/{} files checked.", index + 1, total);
    }

    Ok(CategoryReport {
        category,
        root: discovered.root,
        files,
    })
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,
    /// Categories whose data root does not exist.
    pub missing_roots: Vec<(Category, PathBuf)>,
    /// Warehouse row counts at the end of the run, absent for check-only runs.
    pub counts: Option<TableCounts>,
}

impl RunReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }
}

/// Runs the whole ETL: song data first, then log data.
///
/// Failing to open the warehouse is the only fatal error. The warehouse is
/// closed before returning, whichever way the run ends.
pub fn run(config: &AppConfig) -> Result<RunReport> {
    let sources = [
        (Category::Song, config.song_data_dir.as_path()),
        (Category::Log, config.log_data_dir.as_path()),
    ];
    let mut report = RunReport::default();

    if config.check_only {
        for (category, root) in sources {
            collect(&mut report, category, root, inspect_data(root, &config.extension, category));
        }
        return Ok(report);
    }

    let mut warehouse = Warehouse::open(&config.db_path)?;
    if config.reset {
        warehouse.reset()?;
    }

    for (category, root) in sources {
        let result = process_data(&mut warehouse, root, &config.extension, category);
        collect(&mut report, category, root, result);
    }

    match warehouse.table_counts() {
        Ok(counts) => report.counts = Some(counts),
        Err(err) => error!("Failed to count warehouse rows: {}", err),
    }
    if let Err(err) = warehouse.close() {
        error!("Failed to close warehouse: {}", err);
    }
    Ok(report)
}

fn collect(
    report: &mut RunReport,
    category: Category,
    root: &Path,
    result: Result<CategoryReport, DiscoverError>,
) {
    match result {
        Ok(category_report) => report.categories.push(category_report),
        Err(DiscoverError::PathNotFound(path)) => {
            error!("No {} data at {:?}, skipping", category, path);
            report.missing_roots.push((category, path));
        }
        Err(err) => {
            error!("Failed to discover {} data under {:?}: {}", category, root, err);
            report.missing_roots.push((category, root.to_path_buf()));
        }
    }
}
