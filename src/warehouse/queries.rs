//! Versioned set of the parameterized statements used by the loader.
//!
//! The statements are fixed text. Each write template records the table it
//! targets, the order in which parameters are bound and what happens when a
//! row with the same key already exists.

use super::schema::{TABLE_ARTISTS, TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIME, TABLE_USERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Plain insert, the table has no natural key.
    None,
    /// Keep the existing row.
    Ignore,
    /// Overwrite the existing row with the incoming values.
    Update,
}

#[derive(Debug)]
pub struct WriteTemplate {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub conflict: ConflictPolicy,
    pub sql: &'static str,
}

#[derive(Debug)]
pub struct QuerySet {
    pub version: usize,
    pub song_insert: WriteTemplate,
    pub artist_insert: WriteTemplate,
    pub time_insert: WriteTemplate,
    pub user_upsert: WriteTemplate,
    pub songplay_insert: WriteTemplate,
    /// Binds title, artist name and duration; yields (song_id, artist_id).
    pub song_select: &'static str,
}

impl QuerySet {
    pub fn write_templates(&self) -> [&WriteTemplate; 5] {
        [
            &self.song_insert,
            &self.artist_insert,
            &self.time_insert,
            &self.user_upsert,
            &self.songplay_insert,
        ]
    }
}

pub const QUERY_SET_V_0: QuerySet = QuerySet {
    version: 0,
    song_insert: WriteTemplate {
        table: TABLE_SONGS,
        columns: &["song_id", "title", "artist_id", "year", "duration"],
        conflict: ConflictPolicy::Ignore,
        sql: "INSERT INTO songs (song_id, title, artist_id, year, duration) \
              VALUES (?1, ?2, ?3, ?4, ?5) \
              ON CONFLICT (song_id) DO NOTHING",
    },
    artist_insert: WriteTemplate {
        table: TABLE_ARTISTS,
        columns: &["artist_id", "name", "location", "latitude", "longitude"],
        conflict: ConflictPolicy::Ignore,
        sql: "INSERT INTO artists (artist_id, name, location, latitude, longitude) \
              VALUES (?1, ?2, ?3, ?4, ?5) \
              ON CONFLICT (artist_id) DO NOTHING",
    },
    time_insert: WriteTemplate {
        table: TABLE_TIME,
        columns: &["start_time", "hour", "day", "week", "month", "year", "weekday"],
        conflict: ConflictPolicy::None,
        sql: "INSERT INTO time (start_time, hour, day, week, month, year, weekday) \
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    },
    user_upsert: WriteTemplate {
        table: TABLE_USERS,
        columns: &["user_id", "first_name", "last_name", "gender", "level"],
        conflict: ConflictPolicy::Update,
        sql: "INSERT INTO users (user_id, first_name, last_name, gender, level) \
              VALUES (?1, ?2, ?3, ?4, ?5) \
              ON CONFLICT (user_id) DO UPDATE SET \
              first_name = excluded.first_name, \
              last_name = excluded.last_name, \
              gender = excluded.gender, \
              level = excluded.level",
    },
    songplay_insert: WriteTemplate {
        table: TABLE_SONGPLAYS,
        columns: &[
            "start_time",
            "user_id",
            "level",
            "song_id",
            "artist_id",
            "session_id",
            "location",
            "user_agent",
        ],
        conflict: ConflictPolicy::None,
        sql: "INSERT INTO songplays \
              (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent) \
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    },
    song_select: "SELECT s.song_id, s.artist_id FROM songs s \
                  JOIN artists a ON s.artist_id = a.artist_id \
                  WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3",
};

pub fn latest_query_set() -> &'static QuerySet {
    &QUERY_SET_V_0
}
