//! Fixture builders for song and log data trees.

use super::constants::*;
use rusqlite::Connection;
use serde_json::{json, Value};
use sparkify_etl::config::{AppConfig, CliConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary data tree laid out like the real input:
/// `song_data/<A>/<B>/<C>/*.json` and `log_data/<year>/<month>/*.json`.
pub struct DataDir {
    pub dir: TempDir,
}

impl DataDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn song_root(&self) -> PathBuf {
        self.dir.path().join("song_data")
    }

    pub fn log_root(&self) -> PathBuf {
        self.dir.path().join("log_data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("sparkify.db")
    }

    pub fn write_song_file(&self, relative: &str, lines: &[Value]) -> PathBuf {
        write_lines(&self.song_root().join(relative), lines)
    }

    pub fn write_log_file(&self, relative: &str, lines: &[Value]) -> PathBuf {
        write_lines(&self.log_root().join(relative), lines)
    }
}

pub fn write_lines(path: &Path, lines: &[Value]) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let content: Vec<String> = lines.iter().map(Value::to_string).collect();
    fs::write(path, content.join("\n")).unwrap();
    path.to_path_buf()
}

pub fn song_line(song_id: &str, title: &str, artist_id: &str, artist: &str, duration: f64) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0
    })
}

pub fn casual_song_line() -> Value {
    song_line(
        CASUAL_SONG_ID,
        CASUAL_TITLE,
        CASUAL_ARTIST_ID,
        CASUAL_ARTIST,
        CASUAL_DURATION,
    )
}

pub fn log_event(page: &str, user_id: &str, level: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Kaylee",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Summers",
        "length": null,
        "level": level,
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "GET",
        "page": page,
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Windows NT 6.1; WOW64)",
        "userId": user_id
    })
}

pub fn next_song_event(
    user_id: &str,
    level: &str,
    ts: i64,
    song: &str,
    artist: &str,
    length: f64,
) -> Value {
    let mut event = log_event("NextSong", user_id, level, ts);
    event["song"] = json!(song);
    event["artist"] = json!(artist);
    event["length"] = json!(length);
    event["method"] = json!("PUT");
    event
}

/// Config loading this data tree into its own database file.
pub fn app_config(data: &DataDir) -> AppConfig {
    let cli = CliConfig {
        db_path: data.db_path(),
        song_data_dir: data.song_root(),
        log_data_dir: data.log_root(),
        ..Default::default()
    };
    AppConfig::resolve(&cli, None).unwrap()
}

/// Makes every insert into `table` whose `column` equals `value` abort.
/// Only the failing statement is undone.
///
/// The warehouse must already exist at `db_path`.
pub fn reject_inserts(db_path: &Path, table: &str, column: &str, value: &str) {
    install_insert_trigger(db_path, table, column, value, "ABORT");
}

/// Like [`reject_inserts`], but the insert rolls back the whole transaction.
pub fn roll_back_on_insert(db_path: &Path, table: &str, column: &str, value: &str) {
    install_insert_trigger(db_path, table, column, value, "ROLLBACK");
}

fn install_insert_trigger(db_path: &Path, table: &str, column: &str, value: &str, action: &str) {
    let conn = Connection::open(db_path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_{table}_{column} BEFORE INSERT ON {table}
         WHEN NEW.{column} = '{value}'
         BEGIN SELECT RAISE({action}, 'rejected by test trigger'); END;"
    ))
    .unwrap();
}

/// Single-value query against the warehouse file, outside any [`Warehouse`].
///
/// [`Warehouse`]: sparkify_etl::Warehouse
pub fn query_one<T: rusqlite::types::FromSql>(db_path: &Path, sql: &str) -> T {
    let conn = Connection::open(db_path).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}
