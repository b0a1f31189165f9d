use super::{read_json_lines, Extracted};
use crate::error::ExtractError;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Page of the events that represent an actual song playback.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One user activity event, as found in the log files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
    /// Empty for events of logged out users.
    #[serde(default, deserialize_with = "deserialize_user_id")]
    pub user_id: String,
    pub page: String,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    pub session_id: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl LogEvent {
    pub fn is_next_song(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }

    pub fn has_user(&self) -> bool {
        !self.user_id.trim().is_empty()
    }
}

/// User ids show up both as strings and as numbers.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Text(String),
        Integer(i64),
    }

    Ok(match Option::<RawUserId>::deserialize(deserializer)? {
        Some(RawUserId::Text(s)) => s,
        Some(RawUserId::Integer(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Extracts every event of a log file, unfiltered.
pub fn extract_log_file<P: AsRef<Path>>(path: P) -> Result<Extracted<LogEvent>, ExtractError> {
    read_json_lines(path.as_ref())
}
